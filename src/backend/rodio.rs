//! rodio-backed audio output.
//!
//! Playback position is tracked with an accumulated-duration clock
//! (`started_at` plus time already played) rather than asking the mixer;
//! seeking rebuilds the sink with `Source::skip_duration`, which works for
//! all the formats we accept.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{PlayerError, Result};
use crate::track::Track;

use super::{AudioBackend, CodecSupport, PlaybackProbe};

/// State shared between the backend (foreground) and its probes (watcher
/// thread). The `Sink` itself is thread-safe; the lock only guards the
/// sink/clock pair so position reads are consistent.
#[derive(Default)]
struct SinkState {
    sink: Option<Sink>,
    started_at: Option<Instant>,
    accumulated: Duration,
    duration: Duration,
}

impl SinkState {
    fn position(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn is_playing(&self) -> bool {
        match (&self.sink, self.started_at) {
            (Some(sink), Some(_)) => !sink.empty(),
            _ => false,
        }
    }
}

pub struct RodioBackend {
    stream: OutputStream,
    path: Option<PathBuf>,
    shared: Arc<Mutex<SinkState>>,
    gain: f32,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::BackendUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped; noisy here.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            path: None,
            shared: Arc::new(Mutex::new(SinkState::default())),
            gain: 1.0,
        })
    }

    /// rodio ships its MP3 decoder unconditionally.
    pub fn codec_support() -> CodecSupport {
        CodecSupport::full()
    }

    /// Decode `path` into a paused sink starting at `start_at`. Also
    /// returns the decoder's own length, when it knows one.
    fn build_sink(&self, path: &PathBuf, start_at: Duration) -> Result<(Sink, Option<Duration>)> {
        let file =
            File::open(path).map_err(|_| PlayerError::FileNotReadable(path.clone()))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|_| PlayerError::DecodeFailure(path.clone()))?;
        let decoded_duration = decoder.total_duration();
        let source = decoder.skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        sink.set_volume(self.gain);
        Ok((sink, decoded_duration))
    }
}

/// Duration of the open stream. The decoder's figure wins; the tag probe
/// is only a fallback, since it covers fewer formats than the decoder
/// accepts.
fn stream_duration(decoded: Option<Duration>, probed: Option<Duration>) -> Duration {
    decoded.or(probed).unwrap_or(Duration::ZERO)
}

impl AudioBackend for RodioBackend {
    fn open(&mut self, track: &Track) -> Result<()> {
        self.close();

        let path = track.path().to_path_buf();
        let (sink, decoded_duration) = self.build_sink(&path, Duration::ZERO)?;

        if let Ok(mut state) = self.shared.lock() {
            state.sink = Some(sink);
            state.started_at = None;
            state.accumulated = Duration::ZERO;
            state.duration = stream_duration(decoded_duration, track.duration);
        }
        self.path = Some(path);
        Ok(())
    }

    fn start(&mut self) {
        if let Ok(mut state) = self.shared.lock() {
            if let Some(sink) = &state.sink {
                sink.play();
                state.started_at = Some(Instant::now());
            }
        }
    }

    fn stop(&mut self) {
        if let Ok(mut state) = self.shared.lock() {
            if let Some(sink) = &state.sink {
                sink.pause();
            }
            if let Some(started) = state.started_at.take() {
                state.accumulated += started.elapsed();
            }
        }
    }

    fn close(&mut self) {
        if let Ok(mut state) = self.shared.lock() {
            if let Some(sink) = state.sink.take() {
                sink.stop();
            }
            state.started_at = None;
            state.accumulated = Duration::ZERO;
            state.duration = Duration::ZERO;
        }
        self.path = None;
    }

    fn is_active(&self) -> bool {
        self.shared.lock().map(|s| s.is_playing()).unwrap_or(false)
    }

    fn position(&self) -> Duration {
        self.shared
            .lock()
            .map(|s| s.position())
            .unwrap_or(Duration::ZERO)
    }

    fn set_position(&mut self, position: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };
        // Rebuild the sink skipping into the file; swap only on success so
        // a read error mid-seek leaves the old stream in place.
        let new_sink = match self.build_sink(&path, position) {
            Ok((sink, _)) => sink,
            Err(e) => {
                log::warn!("seek failed for {}: {e}", path.display());
                return;
            }
        };
        if let Ok(mut state) = self.shared.lock() {
            let was_started = state.started_at.is_some();
            if let Some(old) = state.sink.take() {
                old.stop();
            }
            if was_started {
                new_sink.play();
                state.started_at = Some(Instant::now());
            } else {
                state.started_at = None;
            }
            state.sink = Some(new_sink);
            state.accumulated = position;
        }
    }

    fn duration(&self) -> Duration {
        self.shared
            .lock()
            .map(|s| s.duration)
            .unwrap_or(Duration::ZERO)
    }

    fn set_gain_db(&mut self, db: f32) -> bool {
        // rodio's volume control is a linear amplitude multiplier.
        let amplitude = if db == f32::NEG_INFINITY {
            0.0
        } else {
            10f32.powf(db / 20.0)
        };
        self.gain = amplitude;
        if let Ok(state) = self.shared.lock() {
            if let Some(sink) = &state.sink {
                sink.set_volume(amplitude);
            }
        }
        true
    }

    fn probe(&self) -> Box<dyn PlaybackProbe> {
        Box::new(RodioProbe {
            shared: self.shared.clone(),
        })
    }
}

struct RodioProbe {
    shared: Arc<Mutex<SinkState>>,
}

impl PlaybackProbe for RodioProbe {
    fn is_playing(&self) -> bool {
        // A poisoned lock means the foreground panicked mid-update; report
        // "still playing" so the watcher never fires a false end signal.
        match self.shared.lock() {
            Ok(state) => state.is_playing(),
            Err(_) => {
                log::warn!("playback state unavailable, assuming still playing");
                true
            }
        }
    }

    fn position(&self) -> Duration {
        self.shared
            .lock()
            .map(|s| s.position())
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Duration {
        self.shared
            .lock()
            .map(|s| s.duration)
            .unwrap_or(Duration::ZERO)
    }
}

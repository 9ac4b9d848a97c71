//! Playback state machine: `Stopped -> Playing <-> Paused -> Stopped`.
//!
//! The engine wraps one [`AudioBackend`] and enforces the single-session
//! rule: play always stops whatever was there first, so at most one stream
//! is ever open. All backend failures surface as `PlayerError` values and
//! leave the engine Stopped; nothing here panics on a bad file.

use std::time::{Duration, Instant};

use crate::backend::{AudioBackend, CodecSupport, PlaybackProbe};
use crate::error::{PlayerError, Result};
use crate::track::{AudioFormat, Track};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Playing,
    Paused,
}

/// One continuous play attempt of a single track. Exists only while the
/// engine is Playing or Paused.
#[derive(Debug)]
pub struct PlaybackSession {
    pub track: Track,
    pub started_at: Instant,
    /// Position recorded at the last pause, microsecond precision.
    pub paused_position: Duration,
}

pub struct PlaybackEngine<B: AudioBackend> {
    backend: B,
    codec: CodecSupport,
    state: EngineState,
    session: Option<PlaybackSession>,
    volume: f32,
}

impl<B: AudioBackend> PlaybackEngine<B> {
    pub fn new(backend: B, codec: CodecSupport) -> Self {
        Self {
            backend,
            codec,
            state: EngineState::Stopped,
            session: None,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    /// Start a new session for `track`, replacing any current one. On
    /// failure the engine is Stopped and the error says why.
    pub fn play(&mut self, track: &Track) -> Result<()> {
        self.stop();

        if track.format() == AudioFormat::Mp3 && !self.codec.mp3 {
            return Err(PlayerError::UnsupportedFormat(format!(
                "{} (no MP3 codec available)",
                track.display_name()
            )));
        }

        self.backend.open(track)?;
        self.backend.start();
        self.state = EngineState::Playing;
        self.session = Some(PlaybackSession {
            track: track.clone(),
            started_at: Instant::now(),
            paused_position: Duration::ZERO,
        });
        log::info!("playing {}", track.display_name());
        Ok(())
    }

    /// Record the exact position and stop output, keeping the stream open.
    /// No-op unless Playing.
    pub fn pause(&mut self) {
        if self.state != EngineState::Playing {
            return;
        }
        let position = self.backend.position();
        self.backend.stop();
        if let Some(session) = &mut self.session {
            session.paused_position = position;
        }
        self.state = EngineState::Paused;
    }

    /// Restore the recorded position and resume output. No-op unless
    /// Paused.
    pub fn resume(&mut self) {
        if self.state != EngineState::Paused {
            return;
        }
        let position = self
            .session
            .as_ref()
            .map(|s| s.paused_position)
            .unwrap_or(Duration::ZERO);
        self.backend.set_position(position);
        self.backend.start();
        self.state = EngineState::Playing;
    }

    /// Release the stream and destroy the session. Safe to call in any
    /// state, idempotent.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.backend.close();
        self.session = None;
        self.state = EngineState::Stopped;
    }

    /// Jump to an absolute position. Output is stopped around the jump so
    /// there is no audible glitch; playback continues if it was Playing.
    pub fn seek(&mut self, position: Duration) {
        if self.session.is_none() {
            return;
        }
        let duration = self.backend.duration();
        let position = if duration > Duration::ZERO {
            position.min(duration)
        } else {
            position
        };

        let was_playing = self.state == EngineState::Playing;
        if was_playing {
            self.backend.stop();
        }
        self.backend.set_position(position);
        if let Some(session) = &mut self.session {
            session.paused_position = position;
        }
        if was_playing {
            self.backend.start();
        }
    }

    /// Linear volume in `[0, 1]`, converted to decibels for the backend
    /// (`dB = 20·log10(level)`). Backends without gain control make this a
    /// silent no-op.
    pub fn set_volume(&mut self, level: f32) {
        let level = level.clamp(0.0, 1.0);
        self.volume = level;
        let db = if level <= 0.0 {
            f32::NEG_INFINITY
        } else {
            20.0 * level.log10()
        };
        if !self.backend.set_gain_db(db) {
            log::debug!("backend has no gain control, ignoring volume change");
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Current position; never fails, `ZERO` when Stopped.
    pub fn position(&self) -> Duration {
        match self.state {
            EngineState::Stopped => Duration::ZERO,
            EngineState::Paused => self
                .session
                .as_ref()
                .map(|s| s.paused_position)
                .unwrap_or(Duration::ZERO),
            EngineState::Playing => self.backend.position(),
        }
    }

    /// Track duration; `ZERO` when Stopped or unknown.
    pub fn duration(&self) -> Duration {
        match self.state {
            EngineState::Stopped => Duration::ZERO,
            _ => self.backend.duration(),
        }
    }

    /// Send view for the end-of-track watcher.
    pub fn probe(&self) -> Box<dyn PlaybackProbe> {
        self.backend.probe()
    }
}

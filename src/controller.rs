//! Orchestration of engine, playlist, advance policy, shuffle cycle and
//! end-of-track watcher into the user-facing operations.
//!
//! Contract: at most one playback session and at most one watcher are
//! alive at any time. Every operation that changes the active track
//! cancels the watcher and stops the session before starting new ones,
//! and bumps the generation counter so a stale end-of-track signal from a
//! previous session can never drive an advance. All mutation happens on
//! the caller's thread; the watcher only sends events into the channel
//! drained by [`PlayerController::process_events`].

use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::time::Duration;

use crate::backend::{AudioBackend, CodecSupport};
use crate::config::{LibrarySettings, Settings};
use crate::engine::{EngineState, PlaybackEngine};
use crate::error::{PlayerError, Result};
use crate::playlist::{self, PlaylistStore};
use crate::policy::{self, RepeatMode};
use crate::shuffle::ShuffleCycle;
use crate::track::Track;
use crate::watcher::{PlayerEvent, TrackEndWatcher, WatcherTiming};

pub struct PlayerController<B: AudioBackend> {
    engine: PlaybackEngine<B>,
    playlist: PlaylistStore,
    current: Option<usize>,
    repeat: RepeatMode,
    shuffle_enabled: bool,
    shuffle: ShuffleCycle,
    watcher: Option<TrackEndWatcher>,
    generation: u64,
    timing: WatcherTiming,
    library: LibrarySettings,
    events_tx: Sender<PlayerEvent>,
    events_rx: Receiver<PlayerEvent>,
}

impl<B: AudioBackend> PlayerController<B> {
    pub fn new(backend: B, codec: CodecSupport, settings: &Settings) -> Self {
        let (events_tx, events_rx) = channel();
        let mut engine = PlaybackEngine::new(backend, codec);
        engine.set_volume(f32::from(settings.playback.volume_percent.min(100)) / 100.0);

        Self {
            engine,
            playlist: PlaylistStore::new(),
            current: None,
            repeat: settings.playback.repeat,
            shuffle_enabled: settings.playback.shuffle,
            shuffle: ShuffleCycle::new(),
            watcher: None,
            generation: 0,
            timing: settings.watcher.timing(),
            library: settings.library.clone(),
            events_tx,
            events_rx,
        }
    }

    // ---- playlist edits -------------------------------------------------

    /// Validate and append one file to the end of the playlist.
    pub fn add_track(&mut self, path: &Path) -> Result<String> {
        let track = Track::from_path(path)?;
        let name = track.display_name();
        self.playlist.push(track);
        self.shuffle.invalidate();
        Ok(format!("added {} ({} in list)", name, self.playlist.len()))
    }

    /// Validate and insert one file at `position` (0..=len).
    pub fn insert_track(&mut self, path: &Path, position: usize) -> Result<String> {
        let track = Track::from_path(path)?;
        let name = track.display_name();
        self.playlist.insert(track, position)?;
        // An insert at or before the current track shifts it up.
        if let Some(c) = self.current {
            if position <= c {
                self.current = Some(c + 1);
            }
        }
        self.shuffle.invalidate();
        Ok(format!("added {} at position {}", name, position + 1))
    }

    /// Append every supported audio file under `dir`, sorted by name.
    pub fn add_directory(&mut self, dir: &Path) -> Result<String> {
        let tracks = playlist::scan_directory(dir, &self.library);
        if tracks.is_empty() {
            return Ok(format!("no playable files under {}", dir.display()));
        }
        let count = tracks.len();
        for track in tracks {
            self.playlist.push(track);
        }
        self.shuffle.invalidate();
        Ok(format!("added {} tracks ({} in list)", count, self.playlist.len()))
    }

    /// Remove the track at `index`. Removing the one currently playing
    /// stops playback along with the edit.
    pub fn remove_track(&mut self, index: usize) -> Result<String> {
        let removed = self.playlist.remove(index)?;
        if self.current == Some(index) {
            self.cancel_watcher();
            self.engine.stop();
        }
        self.current = playlist::index_after_remove(self.current, index);
        self.shuffle.invalidate();
        Ok(format!("removed {}", removed.display_name()))
    }

    /// Stop playback and empty the playlist.
    pub fn clear(&mut self) -> Result<String> {
        self.cancel_watcher();
        self.engine.stop();
        self.playlist.clear();
        self.current = None;
        self.shuffle.invalidate();
        Ok("playlist cleared".to_string())
    }

    pub fn move_track(&mut self, from: usize, to: usize) -> Result<String> {
        self.playlist.move_track(from, to)?;
        self.current = playlist::index_after_move(self.current, from, to);
        self.shuffle.invalidate();
        Ok(format!("moved track to position {}", to + 1))
    }

    pub fn move_up(&mut self, index: usize) -> Result<String> {
        if index >= self.playlist.len() {
            return Err(PlayerError::InvalidIndex {
                index,
                len: self.playlist.len(),
            });
        }
        if index == 0 {
            return Ok("track is already first".to_string());
        }
        self.move_track(index, index - 1)
    }

    pub fn move_down(&mut self, index: usize) -> Result<String> {
        let len = self.playlist.len();
        if index >= len {
            return Err(PlayerError::InvalidIndex { index, len });
        }
        if index + 1 == len {
            return Ok("track is already last".to_string());
        }
        self.move_track(index, index + 1)
    }

    // ---- transport ------------------------------------------------------

    /// Start playing the track at `index`.
    pub fn play_selected(&mut self, index: usize) -> Result<String> {
        if self.playlist.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        self.play_index(index)
    }

    /// Pause, recording the exact position. No-op when not playing.
    pub fn pause(&mut self) -> Result<String> {
        if self.engine.state() != EngineState::Playing {
            return Ok("nothing to pause".to_string());
        }
        self.cancel_watcher();
        self.engine.pause();
        Ok(format!("paused at {}", format_time(self.engine.position())))
    }

    /// Resume from the recorded position. No-op when not paused.
    pub fn resume(&mut self) -> Result<String> {
        if self.engine.state() != EngineState::Paused {
            return Ok("nothing to resume".to_string());
        }
        self.engine.resume();
        // Same session continues: keep the generation, fresh watcher.
        self.spawn_watcher();
        Ok(format!("resumed at {}", format_time(self.engine.position())))
    }

    /// Stop playback and clear the current track.
    pub fn stop(&mut self) -> Result<String> {
        self.cancel_watcher();
        self.engine.stop();
        self.current = None;
        Ok("stopped".to_string())
    }

    /// Skip to the next track. While repeat-one is active this demotes the
    /// mode to repeat-all first, so that pressing next has a visible
    /// effect beyond replaying the same track.
    pub fn next(&mut self) -> Result<String> {
        if self.playlist.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        let mut demoted = false;
        if self.repeat == RepeatMode::One {
            self.repeat = RepeatMode::All;
            demoted = true;
        }

        let status = self.advance()?;
        if demoted {
            Ok(format!("{status} (switched to repeat all)"))
        } else {
            Ok(status)
        }
    }

    /// Skip to the previous track; wraps from the first to the last and
    /// ignores shuffle.
    pub fn previous(&mut self) -> Result<String> {
        if self.playlist.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        let index = policy::previous_index(self.current, self.playlist.len())
            .ok_or(PlayerError::EmptyPlaylist)?;
        self.play_index(index)
    }

    pub fn toggle_repeat(&mut self) -> Result<String> {
        self.repeat = self.repeat.cycled();
        Ok(self.repeat.label().to_string())
    }

    pub fn toggle_shuffle(&mut self) -> Result<String> {
        self.shuffle_enabled = !self.shuffle_enabled;
        if self.shuffle_enabled {
            self.shuffle.start(self.playlist.len());
            Ok("shuffle on, no repeats until the cycle completes".to_string())
        } else {
            self.shuffle.invalidate();
            Ok("shuffle off".to_string())
        }
    }

    /// Seek to a percentage of the current track.
    pub fn seek_percent(&mut self, percent: u8) -> Result<String> {
        if self.engine.state() == EngineState::Stopped {
            return Ok("nothing is playing".to_string());
        }
        let percent = percent.min(100);
        let duration = self.engine.duration();
        let target = duration.mul_f64(f64::from(percent) / 100.0);
        self.engine.seek(target);
        Ok(format!("seeked to {}", format_time(target)))
    }

    /// Volume as a percentage (0-100), mapped to linear gain.
    pub fn set_volume(&mut self, percent: u8) -> Result<String> {
        let percent = percent.min(100);
        self.engine.set_volume(f32::from(percent) / 100.0);
        Ok(format!("volume {percent}%"))
    }

    // ---- event pump ------------------------------------------------------

    /// Drain watcher events on the caller's thread, performing the natural
    /// end-of-track advance. Returns a status string when something
    /// happened. Stale events from cancelled sessions are discarded here,
    /// which is what makes watcher cancellation race-free.
    pub fn process_events(&mut self) -> Option<String> {
        loop {
            match self.events_rx.try_recv() {
                Ok(PlayerEvent::TrackEnded { generation }) => {
                    if generation != self.generation {
                        log::debug!("discarding stale track-end signal (session {generation})");
                        continue;
                    }
                    if self.engine.state() != EngineState::Playing {
                        continue;
                    }
                    return self.handle_track_end();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    fn handle_track_end(&mut self) -> Option<String> {
        if self.playlist.is_empty() {
            return None;
        }
        let result = if self.repeat == RepeatMode::One {
            // Replay the same track; unlike a manual next this keeps the
            // mode untouched.
            match self.current {
                Some(index) => self.play_index(index),
                None => return None,
            }
        } else {
            self.advance()
        };
        match result {
            Ok(status) => Some(status),
            Err(e) => {
                log::warn!("auto-advance failed: {e}");
                Some(format!("auto-advance failed: {e}"))
            }
        }
    }

    /// Shared by manual next and natural track end: pick the next index
    /// through the shuffle cycle or the linear policy, then play it.
    fn advance(&mut self) -> Result<String> {
        let len = self.playlist.len();
        let index = if self.shuffle_enabled {
            self.shuffle
                .take_next(self.current, len)
                .ok_or(PlayerError::EmptyPlaylist)?
        } else {
            policy::next_index(self.current, len, self.repeat)
                .ok_or(PlayerError::EmptyPlaylist)?
        };

        let status = self.play_index(index)?;
        if self.shuffle_enabled {
            let (done, total) = self.shuffle.progress(len);
            Ok(format!("{status} [shuffle {done} of {total}]"))
        } else {
            Ok(status)
        }
    }

    fn play_index(&mut self, index: usize) -> Result<String> {
        let track = self
            .playlist
            .get(index)
            .cloned()
            .ok_or(PlayerError::InvalidIndex {
                index,
                len: self.playlist.len(),
            })?;

        // New session: kill the old watcher first so there is never more
        // than one, and bump the generation so anything it already sent
        // gets discarded.
        self.cancel_watcher();
        self.generation += 1;
        self.engine.play(&track)?;
        self.current = Some(index);
        self.spawn_watcher();

        Ok(format!(
            "playing {} of {}: {}",
            index + 1,
            self.playlist.len(),
            track.display_name()
        ))
    }

    fn spawn_watcher(&mut self) {
        debug_assert!(self.watcher.is_none());
        self.watcher = Some(TrackEndWatcher::spawn(
            self.engine.probe(),
            self.generation,
            self.events_tx.clone(),
            self.timing,
        ));
    }

    fn cancel_watcher(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.cancel();
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn entries(&self) -> Vec<(usize, String)> {
        self.playlist.entries()
    }

    pub fn track_count(&self) -> usize {
        self.playlist.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn position(&self) -> Duration {
        self.engine.position()
    }

    pub fn duration(&self) -> Duration {
        self.engine.duration()
    }
}

/// mm:ss rendering for status lines.
pub fn format_time(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests;

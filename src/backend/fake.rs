//! Scriptable in-memory backend for unit tests. Tests hold the shared
//! state handle and flip fields to simulate decode failures, track endings
//! and backends without gain control.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{PlayerError, Result};
use crate::track::Track;

use super::{AudioBackend, PlaybackProbe};

#[derive(Debug)]
pub struct FakeState {
    pub open: bool,
    pub playing: bool,
    pub position: Duration,
    pub duration: Duration,
    /// Last gain applied, in decibels.
    pub gain_db: Option<f32>,
    pub gain_supported: bool,
    /// When set, the next `open` fails with `DecodeFailure`.
    pub fail_open: bool,
    /// URIs opened, in order.
    pub opened: Vec<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            open: false,
            playing: false,
            position: Duration::ZERO,
            duration: Duration::from_secs(60),
            gain_db: None,
            gain_supported: true,
            fail_open: false,
            opened: Vec::new(),
        }
    }
}

pub type FakeHandle = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    state: FakeHandle,
}

impl FakeBackend {
    pub fn new() -> (Self, FakeHandle) {
        let state: FakeHandle = Arc::new(Mutex::new(FakeState::default()));
        (Self { state: state.clone() }, state)
    }
}

impl AudioBackend for FakeBackend {
    fn open(&mut self, track: &Track) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.fail_open {
            return Err(PlayerError::DecodeFailure(track.path().to_path_buf()));
        }
        s.open = true;
        s.playing = false;
        s.position = Duration::ZERO;
        s.opened.push(track.uri().to_string());
        Ok(())
    }

    fn start(&mut self) {
        let mut s = self.state.lock().unwrap();
        if s.open {
            s.playing = true;
        }
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn close(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.open = false;
        s.playing = false;
        s.position = Duration::ZERO;
    }

    fn is_active(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn set_position(&mut self, position: Duration) {
        self.state.lock().unwrap().position = position;
    }

    fn duration(&self) -> Duration {
        let s = self.state.lock().unwrap();
        if s.open { s.duration } else { Duration::ZERO }
    }

    fn set_gain_db(&mut self, db: f32) -> bool {
        let mut s = self.state.lock().unwrap();
        if !s.gain_supported {
            return false;
        }
        s.gain_db = Some(db);
        true
    }

    fn probe(&self) -> Box<dyn PlaybackProbe> {
        Box::new(FakeProbe {
            state: self.state.clone(),
        })
    }
}

pub struct FakeProbe {
    pub state: FakeHandle,
}

impl PlaybackProbe for FakeProbe {
    fn is_playing(&self) -> bool {
        // Undeterminable state counts as still playing.
        self.state.lock().map(|s| s.playing).unwrap_or(true)
    }

    fn position(&self) -> Duration {
        self.state.lock().map(|s| s.position).unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Duration {
        self.state.lock().map(|s| s.duration).unwrap_or(Duration::ZERO)
    }
}

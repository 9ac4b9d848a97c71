//! Audio output abstraction.
//!
//! [`AudioBackend`] is the capability the engine depends on: open a decoded
//! stream for one track, start/stop output, position get/set, duration and
//! gain. The production implementation wraps rodio; tests drive a
//! scriptable fake. A backend also hands out [`PlaybackProbe`]s, cheap
//! `Send` views onto its live state that the end-of-track watcher polls
//! from its background thread without touching the backend itself.

use std::time::Duration;

use crate::error::Result;
use crate::track::Track;

mod rodio;

#[cfg(test)]
pub mod fake;

pub use self::rodio::RodioBackend;

/// Optional codec capabilities, decided once at startup and injected into
/// the engine. WAV/AU/AIFF decoding is assumed; MP3 is the one format that
/// may be missing, in which case playing an `.mp3` degrades to an
/// `UnsupportedFormat` error instead of failing deeper in the stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CodecSupport {
    pub mp3: bool,
}

impl CodecSupport {
    /// Only the formats every backend decodes.
    pub fn native() -> Self {
        Self { mp3: false }
    }

    pub fn full() -> Self {
        Self { mp3: true }
    }
}

/// Single-stream audio output. At most one stream is open at a time;
/// `open` on a busy backend releases the previous stream first.
pub trait AudioBackend {
    /// Open a decoded stream for `track`, ready to start, output stopped.
    fn open(&mut self, track: &Track) -> Result<()>;

    /// Begin or continue producing output. No-op with nothing open.
    fn start(&mut self);

    /// Stop producing output but keep the stream open.
    fn stop(&mut self);

    /// Release the stream entirely.
    fn close(&mut self);

    /// Whether output is being produced right now. Goes false on its own
    /// when the stream runs out of samples.
    fn is_active(&self) -> bool;

    /// Current position in the open stream, `ZERO` when nothing is open.
    fn position(&self) -> Duration;

    /// Jump to an absolute position, preserving the started/stopped state.
    fn set_position(&mut self, position: Duration);

    /// Total length of the open stream, `ZERO` when unknown or closed.
    fn duration(&self) -> Duration;

    /// Apply gain in decibels. Returns false when the backend has no gain
    /// control, in which case the caller treats volume as a no-op.
    fn set_gain_db(&mut self, db: f32) -> bool;

    /// A `Send` read-only view for background observation.
    fn probe(&self) -> Box<dyn PlaybackProbe>;
}

/// Read-only, thread-safe view of a backend's playback state.
///
/// Implementations must never panic on internal failures; if the state
/// cannot be determined they report "still playing" so a query hiccup can
/// never produce a false end-of-track signal.
pub trait PlaybackProbe: Send {
    fn is_playing(&self) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
}

//! Background end-of-track detection.
//!
//! One watcher thread per play session polls a [`PlaybackProbe`] and sends
//! a single `TrackEnded` event when the track plays out naturally. A
//! not-playing observation alone is not enough: it could be a pause or a
//! momentary stall, so the watcher waits out a grace delay, re-checks, and
//! additionally requires the position to sit within a trailing margin of
//! the duration. The generation token lets the controller discard a signal
//! that was already in flight when a new session started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backend::PlaybackProbe;

/// Poll/grace/margin intervals; see `Settings::watcher` for the defaults
/// (1 s / 1 s / 2000 ms).
#[derive(Debug, Copy, Clone)]
pub struct WatcherTiming {
    pub poll_interval: Duration,
    pub grace_delay: Duration,
    pub end_margin: Duration,
}

impl Default for WatcherTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            grace_delay: Duration::from_secs(1),
            end_margin: Duration::from_millis(2000),
        }
    }
}

/// Event delivered from the watcher thread to the foreground.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackEnded { generation: u64 },
}

/// Handle to one live watcher thread. Dropping it cancels the thread.
pub struct TrackEndWatcher {
    cancel: Arc<AtomicBool>,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TrackEndWatcher {
    pub fn spawn(
        probe: Box<dyn PlaybackProbe>,
        generation: u64,
        tx: Sender<PlayerEvent>,
        timing: WatcherTiming,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let handle = thread::spawn(move || watch(probe, generation, tx, timing, flag));
        Self {
            cancel,
            generation,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the watcher. The thread notices at its next wakeup; the
    /// foreground never blocks waiting for it, and any signal it already
    /// sent is rejected later by the generation check.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            drop(handle);
        }
    }
}

impl Drop for TrackEndWatcher {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

fn watch(
    probe: Box<dyn PlaybackProbe>,
    generation: u64,
    tx: Sender<PlayerEvent>,
    timing: WatcherTiming,
    cancel: Arc<AtomicBool>,
) {
    let cancelled = || cancel.load(Ordering::Acquire);

    loop {
        thread::sleep(timing.poll_interval);
        if cancelled() {
            return;
        }
        if probe.is_playing() {
            continue;
        }

        // Not playing: wait out the grace delay before trusting it, so a
        // concurrent pause() does not read as a finished track.
        thread::sleep(timing.grace_delay);
        if cancelled() {
            return;
        }
        if probe.is_playing() {
            continue;
        }

        let position = probe.position();
        let duration = probe.duration();
        if duration > Duration::ZERO && position + timing.end_margin >= duration {
            log::debug!(
                "track ended at {position:?} of {duration:?} (session {generation})"
            );
            let _ = tx.send(PlayerEvent::TrackEnded { generation });
            return;
        }
        // Stopped far from the end: a transient pause. Keep polling until
        // cancelled or playback resumes.
    }
}

//! No-repeat shuffle cycle: a random permutation consumed one index at a
//! time, regenerated only when exhausted.
//!
//! Invariant while active: `played` and `remaining` are disjoint and
//! together cover `0..len`. The head of `remaining` is the track being
//! played right now; it only moves to `played` on the *next* call, so the
//! current index stays retrievable.

use rand::seq::SliceRandom;

/// Stateful generator of a shuffled play order.
#[derive(Debug, Default)]
pub struct ShuffleCycle {
    played: Vec<usize>,
    remaining: Vec<usize>,
}

impl ShuffleCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh cycle over `0..len` in uniformly random order.
    pub fn start(&mut self, len: usize) {
        self.played.clear();
        self.remaining = (0..len).collect();
        self.remaining.shuffle(&mut rand::rng());
    }

    /// Drop all cycle state. Positional indices go stale on every
    /// structural playlist edit, so the controller calls this and lazily
    /// restarts on the next shuffled advance.
    pub fn invalidate(&mut self) {
        self.played.clear();
        self.remaining.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.played.is_empty() || !self.remaining.is_empty()
    }

    /// Pick the next index in the cycle.
    ///
    /// Marks `current` as played first (idempotent if it is not pending),
    /// regenerates a full fresh permutation when the cycle is exhausted,
    /// and returns the head of the remaining order without consuming it.
    /// Returns `None` only for an empty playlist.
    pub fn take_next(&mut self, current: Option<usize>, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if !self.is_active() {
            self.start(len);
        }

        if let Some(c) = current {
            if let Some(pos) = self.remaining.iter().position(|&i| i == c) {
                self.remaining.remove(pos);
                self.played.push(c);
            }
        }

        if self.remaining.is_empty() {
            // End of cycle: every track has played exactly once. A new
            // permutation starts regardless of repeat mode; repeat-off
            // keeps looping too, matching the player's observed behavior.
            self.start(len);
        }

        self.remaining.first().copied()
    }

    /// Cycle progress as (played-or-playing, total), for status lines.
    pub fn progress(&self, len: usize) -> (usize, usize) {
        (self.played.len().saturating_add(1).min(len), len)
    }
}

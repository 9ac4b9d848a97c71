//! Ordered, mutable track sequence and the current-index renumbering rules.
//!
//! The store holds no playback state. The controller keeps its own current
//! index and uses [`index_after_remove`] / [`index_after_move`] to keep it
//! consistent across structural edits.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{PlayerError, Result};
use crate::track::{self, Track};

/// Ordered sequence of tracks; insertion order is play order. The same
/// file may appear more than once.
#[derive(Default)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Append at the end of the list.
    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Insert at `position`, which may equal `len` (append).
    pub fn insert(&mut self, track: Track, position: usize) -> Result<()> {
        if position > self.tracks.len() {
            return Err(PlayerError::InvalidPosition {
                position,
                len: self.tracks.len(),
            });
        }
        self.tracks.insert(position, track);
        Ok(())
    }

    /// Remove and return the track at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(PlayerError::InvalidIndex {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(self.tracks.remove(index))
    }

    /// Move a track with remove-then-insert semantics.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlayerError::InvalidIndex { index: from, len });
        }
        if to >= len {
            return Err(PlayerError::InvalidIndex { index: to, len });
        }
        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Read-only display listing: 1-based position plus decoded filename.
    pub fn entries(&self) -> Vec<(usize, String)> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (i + 1, t.display_name()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

/// Collect every supported audio file under `dir`, sorted by display name.
pub fn scan_directory(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(depth) = settings.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_file() && track::is_supported_path(e.path()))
        .filter_map(|e| Track::from_path(e.path()).ok())
        .collect();

    tracks.sort_by(|a, b| {
        a.display_name()
            .to_lowercase()
            .cmp(&b.display_name().to_lowercase())
    });
    tracks
}

/// Where the current index lands after `remove(removed)`.
///
/// Removing the current track itself clears it (the caller is responsible
/// for stopping playback alongside the edit); removing an earlier track
/// shifts it down by one.
pub fn index_after_remove(current: Option<usize>, removed: usize) -> Option<usize> {
    match current {
        Some(c) if c == removed => None,
        Some(c) if c > removed => Some(c - 1),
        other => other,
    }
}

/// Where the current index lands after `move_track(from, to)`.
pub fn index_after_move(current: Option<usize>, from: usize, to: usize) -> Option<usize> {
    let c = current?;
    if c == from {
        Some(to)
    } else if from < c && c <= to {
        Some(c - 1)
    } else if to <= c && c < from {
        Some(c + 1)
    } else {
        Some(c)
    }
}

#[cfg(test)]
mod tests;

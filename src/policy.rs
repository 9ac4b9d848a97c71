//! Pure next/previous track selection.
//!
//! These functions know nothing about shuffle; when shuffle is enabled the
//! controller asks the [`crate::shuffle::ShuffleCycle`] instead of
//! [`next_index`].

use serde::Deserialize;

/// Repeat behavior at track boundaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// No repetition. Linear playback still wraps at the end of the list,
    /// matching the long-observed behavior of the player.
    #[serde(alias = "none", alias = "no-repeat")]
    Off,
    /// Wrap around at the end of the list.
    #[serde(alias = "repeat-all")]
    All,
    /// Repeat the current track when it ends.
    #[serde(alias = "repeat-one")]
    One,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Off
    }
}

impl RepeatMode {
    /// User toggle order: Off -> All -> One -> Off.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "repeat off",
            Self::All => "repeat all",
            Self::One => "repeat one",
        }
    }
}

/// Next track for linear (non-shuffle) playback.
///
/// `One` stays put; `Off` and `All` both advance and wrap to the start at
/// the end of the list. With no current track playback begins at 0.
pub fn next_index(current: Option<usize>, len: usize, repeat: RepeatMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = match current {
        Some(c) => c,
        None => return Some(0),
    };
    match repeat {
        RepeatMode::One => Some(current),
        RepeatMode::Off | RepeatMode::All => {
            if current + 1 < len {
                Some(current + 1)
            } else {
                Some(0)
            }
        }
    }
}

/// Previous track. Ignores both repeat and shuffle; wraps from the first
/// track to the last.
pub fn previous_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(c) if c > 0 => Some(c - 1),
        _ => Some(len - 1),
    }
}

use serde::Deserialize;

use crate::policy::RepeatMode;
use crate::watcher::WatcherTiming;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tocata/config.toml` or
/// `~/.config/tocata/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TOCATA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub watcher: WatcherSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Initial repeat mode: "off", "all" or "one".
    pub repeat: RepeatMode,
    /// Initial volume as a percentage (0-100).
    pub volume_percent: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatMode::Off,
            volume_percent: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// How often the end-of-track watcher samples playback state.
    pub poll_interval_ms: u64,
    /// How long a not-playing observation must persist before it counts.
    pub grace_delay_ms: u64,
    /// A track only counts as finished when its position is within this
    /// margin of the duration.
    pub end_margin_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            grace_delay_ms: 1000,
            end_margin_ms: 2000,
        }
    }
}

impl WatcherSettings {
    pub fn timing(&self) -> WatcherTiming {
        WatcherTiming {
            poll_interval: std::time::Duration::from_millis(self.poll_interval_ms),
            grace_delay: std::time::Duration::from_millis(self.grace_delay_ms),
            end_margin: std::time::Duration::from_millis(self.end_margin_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether to follow symlinks when adding a whole directory.
    pub follow_links: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            follow_links: true,
            max_depth: None,
        }
    }
}

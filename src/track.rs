//! Track references: format whitelist, URI normalization and display names.
//!
//! A [`Track`] is an immutable reference to one playable audio file. The
//! local path is normalized into a `file:/` URI (backslashes flattened to
//! forward slashes) which is what gets shown and stored; the original path
//! is kept alongside for the backend to open.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;

use crate::error::{PlayerError, Result};

/// The fixed set of playable extensions, checked case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["wav", "au", "aiff", "mp3"];

/// Container format of a track, derived from its extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Au,
    Aiff,
    Mp3,
}

impl AudioFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "au" => Some(Self::Au),
            "aiff" => Some(Self::Aiff),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }
}

/// One playable audio file. Immutable once created; owned by the playlist
/// while listed and only borrowed by the engine during playback.
#[derive(Debug, Clone)]
pub struct Track {
    path: PathBuf,
    uri: String,
    format: AudioFormat,
    /// Tag title, when the file carries one.
    pub title: Option<String>,
    /// Duration probed from the file's properties, when available.
    pub duration: Option<Duration>,
}

impl Track {
    /// Validate and normalize a local file into a `Track`.
    ///
    /// Rejects unknown extensions up front (`UnsupportedFormat`) and files
    /// that cannot be opened for reading (`FileNotReadable`). Metadata
    /// probing is best-effort; a file with unreadable tags is still a
    /// valid track.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let format = AudioFormat::from_extension(ext).ok_or_else(|| {
            PlayerError::UnsupportedFormat(
                path.file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("<unnamed>")
                    .to_string(),
            )
        })?;

        File::open(path).map_err(|_| PlayerError::FileNotReadable(path.to_path_buf()))?;

        let mut title = None;
        let mut duration = None;
        if let Ok(tagged) = lofty::read_from_path(path) {
            duration = Some(tagged.properties().duration());
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                    let v = v.trim();
                    if !v.is_empty() {
                        title = Some(v.to_string());
                    }
                }
            }
        }

        Ok(Self {
            uri: file_uri(path),
            path: path.to_path_buf(),
            format,
            title,
            duration,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The normalized `file:/` form of the track's location.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Human-readable name: the final URI segment, percent-decoded.
    pub fn display_name(&self) -> String {
        let segment = self.uri.rsplit('/').next().unwrap_or(&self.uri);
        percent_decode(segment)
    }
}

/// Whether a path has one of the supported extensions. Used by directory
/// scans to filter before the heavier `Track::from_path` validation.
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(AudioFormat::from_extension)
        .is_some()
}

/// Convert a local path to URI form: backslashes become forward slashes
/// and the result is prefixed with `file:/`.
pub fn file_uri(path: &Path) -> String {
    let flat = path.to_string_lossy().replace('\\', "/");
    format!("file:/{}", flat.trim_start_matches('/'))
}

/// Decode `%xx` escapes; malformed escapes are kept verbatim.
fn percent_decode(s: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 3 <= bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

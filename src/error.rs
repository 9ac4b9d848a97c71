//! Error type shared by the engine, playlist and controller layers.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

/// Everything that can go wrong below the UI. Engine-level failures leave
/// the engine in a consistent Stopped state; structural playlist errors are
/// rejected before any mutation happens.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("cannot read file: {0}")]
    FileNotReadable(PathBuf),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("cannot decode: {0}")]
    DecodeFailure(PathBuf),

    #[error("index {index} out of range, playlist has {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    #[error("the playlist is empty")]
    EmptyPlaylist,

    #[error("position {position} out of range, valid range is 0..={len}")]
    InvalidPosition { position: usize, len: usize },
}

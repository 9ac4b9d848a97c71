//! Playlist-driven audio player engine.
//!
//! The crate is split into a small set of layers: [`backend`] wraps the
//! actual audio output (rodio in production, a scriptable fake in tests),
//! [`engine`] holds the Stopped/Playing/Paused state machine on top of it,
//! [`watcher`] detects natural end-of-track from a background thread, and
//! [`controller`] ties those together with the [`playlist`], the advance
//! [`policy`] and the no-repeat [`shuffle`] cycle into the user-facing
//! operations (play/pause/next/previous/repeat/shuffle/edit).
//!
//! The binary in `main.rs` is just one possible frontend; everything it
//! does goes through [`controller::PlayerController`].

pub mod backend;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod playlist;
pub mod policy;
pub mod shuffle;
pub mod track;
pub mod watcher;

pub use controller::PlayerController;
pub use error::{PlayerError, Result};
pub use policy::RepeatMode;
pub use track::Track;

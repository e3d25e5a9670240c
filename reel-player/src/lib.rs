//! # Reel Player Library (reel-player)
//!
//! Presents a vertically paged sequence of reels, narrates the active reel
//! aloud and advances to the next one when narration finishes, while
//! following whichever reel the user scrolls into view.
//!
//! **Architecture:** a pure reducer (`playback::controller`) driven by a
//! single-task tokio runtime (`playback::engine`) that owns the narration
//! adapter and both timers.

pub mod config;
pub mod error;
pub mod narration;
pub mod playback;
pub mod viewport;

pub use error::{Error, Result};
pub use playback::{ReelEngine, ReelHandle, ReelView};

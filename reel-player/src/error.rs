//! Error types for reel-player
//!
//! Errors only exist at the edges: configuration, the article file and the
//! narration engine. The controller itself never fails; it only reports state.

use thiserror::Error;

/// Main error type for reel-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from reel-common
    #[error(transparent)]
    Common(#[from] reel_common::Error),

    /// Speech capability missing or refusing to speak
    #[error("Narration unavailable: {0}")]
    NarrationUnavailable(String),
}

/// Convenience Result type using reel-player Error
pub type Result<T> = std::result::Result<T, Error>;

//! Common error types for the reels workspace

use thiserror::Error;

/// Common result type for reels operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the reels crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Article feed could not be decoded
    #[error("Feed decode error: {0}")]
    FeedDecode(#[from] serde_json::Error),
}

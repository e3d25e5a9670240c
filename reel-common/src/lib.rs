//! # Reels Common Library
//!
//! Shared code for the reels playback crates including:
//! - Article and reel data model (`ReelItem`, `ReelSet`)
//! - Feed filtering by category, search text and country
//! - Event types (`ReelEvent` enum) and the broadcast `EventBus`
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod item;

pub use error::{Error, Result};
pub use events::{EventBus, PlaybackState, ReelEvent};
pub use item::{Article, ReelItem, ReelSet};

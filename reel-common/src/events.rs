//! Event types for the reels event system
//!
//! # Architecture
//!
//! Reels playback uses hybrid communication:
//! - **EventBus** (tokio::broadcast): one-to-many notification of the presentation layer
//! - **Command channels** (tokio::mpsc): taps, scrolls and set changes into the engine
//! - **Watch channel**: latest `{activeIndex, isPlaying, isIconVisible}` snapshot

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Controller playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing speaking, no pending advance
    #[default]
    Idle,
    /// Narration engine is reading the active reel
    Speaking,
    /// Narration ended; waiting out the gap before the next reel
    Transitioning,
}

impl PlaybackState {
    /// Idle is the only state reported to the view as "not playing"
    pub fn is_playing(self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Speaking => write!(f, "speaking"),
            PlaybackState::Transitioning => write!(f, "transitioning"),
        }
    }
}

/// Reels event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReelEvent {
    /// A new reel set was installed and playback reset to its first reel
    ReelSetLoaded {
        session_id: Uuid,
        item_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The installed reel set is empty; the view should show its empty state
    NoNarratableContent {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback state changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active reel changed
    ActiveReelChanged {
        index: Option<usize>,
        identity: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Narration engine confirmed that speech started
    NarrationStarted {
        index: usize,
        locale: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The view must smooth-scroll its container to this reel
    ScrollRequested {
        index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Play/pause glyph shown or hidden
    IconVisibilityChanged {
        visible: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Engine torn down; no further events follow
    Disposed {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for [`ReelEvent`]s
///
/// Slow subscribers never block the engine; they see `Lagged` instead.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReelEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ReelEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: ReelEvent) -> Result<usize, broadcast::error::SendError<ReelEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ReelEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

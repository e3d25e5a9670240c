//! Reel playback
//!
//! - `controller`: the state machine (pure, no I/O)
//! - `events`: its inputs and effects
//! - `icon`: play/pause glyph bookkeeping
//! - `engine`: tokio runtime that owns timers and narration and feeds the controller

pub mod controller;
pub mod engine;
pub mod events;
pub mod icon;

pub use controller::{ReelController, ReelView};
pub use engine::{ReelEngine, ReelHandle};
pub use events::{ControllerInput, Effect, TimerToken};

//! Controller inputs and effects
//!
//! Everything that can happen to the controller arrives as a
//! [`ControllerInput`]; everything it wants done to the outside world leaves
//! as an [`Effect`]. The runtime owns the timers and the narration adapter
//! and turns effects into calls.

use reel_common::ReelSet;
use std::time::Duration;

use crate::narration::NarrationHandle;

/// Identifies one armed timer
///
/// A firing whose token is not the one currently armed is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Events delivered to the controller, in the order they happened
#[derive(Debug, Clone)]
pub enum ControllerInput {
    /// Upstream supplied a new set (first load, category or search change)
    ReplaceReels(ReelSet),

    /// User tapped the reel
    TogglePlayPause,

    /// Viewport tracker reports this reel as fully visible
    Visible(usize),

    /// Narration engine began speaking
    NarrationStarted(NarrationHandle),

    /// Narration engine finished speaking
    NarrationEnded(NarrationHandle),

    /// Narration engine refused to speak
    NarrationFailed(NarrationHandle),

    /// Auto-advance gap elapsed
    AdvanceElapsed(TimerToken),

    /// Icon window elapsed
    IconElapsed(TimerToken),

    /// View torn down
    Dispose,
}

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start narrating `text` for reel `index`
    Speak {
        handle: NarrationHandle,
        index: usize,
        text: String,
    },

    /// Stop whatever the narration engine is saying
    CancelNarration,

    /// Arm the auto-advance timer
    ScheduleAdvance { token: TimerToken, delay: Duration },

    /// Disarm the auto-advance timer
    CancelAdvance,

    /// Arm the icon-hide timer
    ScheduleIconHide { token: TimerToken, delay: Duration },

    /// Disarm the icon-hide timer
    CancelIconHide,

    /// Ask the view to smooth-scroll to this reel
    ScrollTo(usize),

    /// The new set has nothing to narrate
    ShowEmptyState,
}

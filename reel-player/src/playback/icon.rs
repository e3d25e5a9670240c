//! Play/pause icon feedback
//!
//! Purely cosmetic. Each tap shows the glyph and re-arms a single hide
//! timer; playback never reads this state.

use super::events::TimerToken;

#[derive(Debug, Default)]
pub struct IconFeedback {
    visible: bool,
    pending: Option<TimerToken>,
}

impl IconFeedback {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the icon under a freshly armed timer
    ///
    /// Returns true if a previous hide timer was still pending and must be cleared.
    pub fn show(&mut self, token: TimerToken) -> bool {
        self.visible = true;
        self.pending.replace(token).is_some()
    }

    /// Handle a hide-timer firing; stale tokens are ignored
    pub fn elapsed(&mut self, token: TimerToken) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.visible = false;
        true
    }

    /// Hide immediately; returns true if a timer was pending
    pub fn reset(&mut self) -> bool {
        self.visible = false;
        self.pending.take().is_some()
    }
}

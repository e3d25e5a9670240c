//! Reel controller state machine
//!
//! Single owner of the active index and playback state. Inputs from the
//! viewport tracker, the narration engine, the timers and the user are
//! funnelled through [`ReelController::handle`], which validates them
//! against the current handle/tokens, mutates state, and returns the
//! effects the runtime must carry out in order.
//!
//! # States
//!
//! - `Idle`: nothing speaking, no pending advance
//! - `Speaking`: narration of `reels[active]` in flight
//! - `Transitioning`: narration ended, advance timer armed
//!
//! Stale callbacks (a narration handle or timer token that is no longer the
//! current one) are discarded without touching state.

use reel_common::{PlaybackState, ReelSet};
use serde::Serialize;
use tracing::debug;

use super::events::{ControllerInput, Effect, TimerToken};
use super::icon::IconFeedback;
use crate::config::Timings;
use crate::narration::NarrationHandle;

/// Read-only state exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReelView {
    pub active_index: Option<usize>,
    pub is_playing: bool,
    pub is_icon_visible: bool,
    pub state: PlaybackState,
}

/// Auto-advance armed after narration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAdvance {
    token: TimerToken,
    next_index: usize,
}

pub struct ReelController {
    reels: ReelSet,
    timings: Timings,
    state: PlaybackState,
    active_index: Option<usize>,
    /// Handle of the utterance currently owned by the controller
    narration: Option<NarrationHandle>,
    advance: Option<PendingAdvance>,
    /// Target of the last programmatic scroll, awaiting its visibility echo
    scroll_target: Option<usize>,
    icon: IconFeedback,
    next_id: u64,
    disposed: bool,
}

impl ReelController {
    pub fn new(timings: Timings) -> Self {
        Self {
            reels: ReelSet::default(),
            timings,
            state: PlaybackState::Idle,
            active_index: None,
            narration: None,
            advance: None,
            scroll_target: None,
            icon: IconFeedback::default(),
            next_id: 0,
            disposed: false,
        }
    }

    pub fn view(&self) -> ReelView {
        ReelView {
            active_index: self.active_index,
            is_playing: self.state.is_playing(),
            is_icon_visible: self.icon.is_visible(),
            state: self.state,
        }
    }

    pub fn reels(&self) -> &ReelSet {
        &self.reels
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_narration(&self) -> Option<NarrationHandle> {
        self.narration
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Apply one input and return the effects to perform, in order
    pub fn handle(&mut self, input: ControllerInput) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.disposed {
            debug!("Controller disposed; ignoring {:?}", input);
            return effects;
        }

        match input {
            ControllerInput::ReplaceReels(reels) => self.initialize(reels, &mut effects),
            ControllerInput::TogglePlayPause => self.toggle(&mut effects),
            ControllerInput::Visible(index) => self.visible(index, &mut effects),
            ControllerInput::NarrationStarted(handle) => {
                if self.narration != Some(handle) {
                    debug!("Ignoring start of stale narration {:?}", handle);
                }
            }
            ControllerInput::NarrationEnded(handle) => self.narration_ended(handle, &mut effects),
            ControllerInput::NarrationFailed(handle) => self.narration_failed(handle, &mut effects),
            ControllerInput::AdvanceElapsed(token) => self.advance_elapsed(token, &mut effects),
            ControllerInput::IconElapsed(token) => {
                if !self.icon.elapsed(token) {
                    debug!("Ignoring stale icon timer {:?}", token);
                }
            }
            ControllerInput::Dispose => self.dispose(&mut effects),
        }

        effects
    }

    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn initialize(&mut self, reels: ReelSet, effects: &mut Vec<Effect>) {
        self.teardown(effects);
        self.reels = reels;
        self.scroll_target = None;

        if self.reels.is_empty() {
            debug!("Reel set empty; idle with no active reel");
            self.state = PlaybackState::Idle;
            self.active_index = None;
            effects.push(Effect::ShowEmptyState);
            return;
        }

        debug!("Reel set of {} installed; starting at 0", self.reels.len());
        self.active_index = Some(0);
        self.scroll_target = Some(0);
        effects.push(Effect::ScrollTo(0));
        self.speak(0, effects);
    }

    fn toggle(&mut self, effects: &mut Vec<Effect>) {
        let Some(index) = self.active_index else {
            debug!("Toggle ignored: no active reel");
            return;
        };

        let token = TimerToken(self.mint());
        if self.icon.show(token) {
            effects.push(Effect::CancelIconHide);
        }
        effects.push(Effect::ScheduleIconHide {
            token,
            delay: self.timings.icon_visible,
        });

        match self.state {
            PlaybackState::Idle => {
                debug!("Toggle: play reel {}", index);
                self.speak(index, effects);
            }
            PlaybackState::Speaking | PlaybackState::Transitioning => {
                debug!("Toggle: pause at reel {}", index);
                self.stop(effects);
            }
        }
    }

    fn visible(&mut self, index: usize, effects: &mut Vec<Effect>) {
        if index >= self.reels.len() {
            debug!("Ignoring visibility of out-of-range reel {}", index);
            return;
        }

        // Any report other than our own scroll target means the user took over
        // the viewport, so the pending confirmation is dropped either way
        if self.scroll_target.take() == Some(index) {
            match self.state {
                PlaybackState::Idle => {
                    // Paused while our own scroll was settling: follow the view silently
                    self.active_index = Some(index);
                    return;
                }
                PlaybackState::Transitioning => return,
                PlaybackState::Speaking if self.active_index == Some(index) => return,
                PlaybackState::Speaking => {}
            }
        }

        let pending_next = self.advance.map(|a| a.next_index);
        let unchanged = match self.state {
            // Scrolling back to the reel that just finished reads it again
            PlaybackState::Transitioning => pending_next == Some(index),
            _ => self.active_index == Some(index),
        };
        if unchanged {
            return;
        }

        debug!("Manual scroll to reel {} (state {})", index, self.state);
        self.active_index = Some(index);
        self.speak(index, effects);
    }

    fn narration_ended(&mut self, handle: NarrationHandle, effects: &mut Vec<Effect>) {
        if self.narration != Some(handle) || self.state != PlaybackState::Speaking {
            debug!("Ignoring end of stale narration {:?}", handle);
            return;
        }
        let Some(index) = self.active_index else {
            return;
        };

        self.narration = None;
        let next_index = (index + 1) % self.reels.len();
        let token = TimerToken(self.mint());
        self.advance = Some(PendingAdvance { token, next_index });
        self.scroll_target = Some(next_index);
        self.state = PlaybackState::Transitioning;

        debug!("Narration of reel {} ended; advancing to {}", index, next_index);
        effects.push(Effect::ScrollTo(next_index));
        effects.push(Effect::ScheduleAdvance {
            token,
            delay: self.timings.auto_advance_delay,
        });
    }

    fn narration_failed(&mut self, handle: NarrationHandle, effects: &mut Vec<Effect>) {
        if self.narration != Some(handle) {
            return;
        }
        debug!("Narration unavailable; returning to idle");
        self.narration = None;
        self.clear_advance(effects);
        self.state = PlaybackState::Idle;
    }

    fn advance_elapsed(&mut self, token: TimerToken, effects: &mut Vec<Effect>) {
        match self.advance {
            Some(pending) if pending.token == token && self.state == PlaybackState::Transitioning => {
                self.advance = None;
                self.active_index = Some(pending.next_index);
                self.speak(pending.next_index, effects);
            }
            _ => debug!("Ignoring stale advance timer {:?}", token),
        }
    }

    fn dispose(&mut self, effects: &mut Vec<Effect>) {
        self.teardown(effects);
        self.state = PlaybackState::Idle;
        self.disposed = true;
    }

    /// Cancel narration and the advance timer, then speak `index`
    fn speak(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let Some(text) = self.reels.get(index).map(|item| item.narration_text.clone()) else {
            return;
        };

        effects.push(Effect::CancelNarration);
        self.clear_advance(effects);

        let handle = NarrationHandle(self.mint());
        self.narration = Some(handle);
        self.state = PlaybackState::Speaking;
        effects.push(Effect::Speak { handle, index, text });
    }

    fn stop(&mut self, effects: &mut Vec<Effect>) {
        effects.push(Effect::CancelNarration);
        self.narration = None;
        self.clear_advance(effects);
        self.state = PlaybackState::Idle;
    }

    fn clear_advance(&mut self, effects: &mut Vec<Effect>) {
        if self.advance.take().is_some() {
            effects.push(Effect::CancelAdvance);
        }
    }

    /// Release narration and every timer
    fn teardown(&mut self, effects: &mut Vec<Effect>) {
        if self.narration.take().is_some() {
            effects.push(Effect::CancelNarration);
        }
        self.clear_advance(effects);
        if self.icon.reset() {
            effects.push(Effect::CancelIconHide);
        }
    }
}

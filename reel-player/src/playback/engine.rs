//! Reel engine runtime
//!
//! One tokio task owns the [`ReelController`], the narration adapter and
//! both timers. Three channels feed it:
//!
//! - **commands** (`ReelHandle` → engine): taps, scroll reports, set changes
//! - **narration signals** (speech engine → engine): started / ended
//! - **timer firings** (timer tasks → engine): advance gap, icon window
//!
//! The task drains them one input at a time, so no two transitions ever run
//! concurrently; they only interleave in arrival order. Results flow out
//! through a `watch` channel (the latest [`ReelView`]) and the [`EventBus`].

use std::collections::VecDeque;
use std::time::Duration;

use reel_common::{EventBus, ReelEvent, ReelSet};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::controller::{ReelController, ReelView};
use super::events::{ControllerInput, Effect};
use crate::config::PlayerConfig;
use crate::narration::{NarrationAdapter, NarrationEngine, NarrationHandle, NarrationSignal};

/// Utterance the adapter accepted, kept for event reporting
struct LiveUtterance {
    handle: NarrationHandle,
    index: usize,
    locale: String,
}

pub struct ReelEngine<E: NarrationEngine> {
    controller: ReelController,
    narration: NarrationAdapter<E>,
    commands: mpsc::UnboundedReceiver<ControllerInput>,
    signals: mpsc::UnboundedReceiver<NarrationSignal>,
    timer_tx: mpsc::UnboundedSender<ControllerInput>,
    timers: mpsc::UnboundedReceiver<ControllerInput>,
    advance_timer: Option<JoinHandle<()>>,
    icon_timer: Option<JoinHandle<()>>,
    live: Option<LiveUtterance>,
    session_id: Uuid,
    event_bus: EventBus,
    view_tx: watch::Sender<ReelView>,
}

impl<E: NarrationEngine> ReelEngine<E> {
    /// Build an engine and the handle that drives it
    ///
    /// Nothing plays until a reel set is supplied through the handle.
    pub fn new(engine: E, config: &PlayerConfig) -> (Self, ReelHandle) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (signal_tx, signals) = mpsc::unbounded_channel();
        let (timer_tx, timers) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ReelView::default());
        let event_bus = EventBus::new(config.event_capacity);

        let handle = ReelHandle {
            commands: command_tx,
            view: view_rx,
            event_bus: event_bus.clone(),
        };

        let engine = Self {
            controller: ReelController::new(config.timings),
            narration: NarrationAdapter::new(engine, signal_tx, config.default_locale.clone()),
            commands,
            signals,
            timer_tx,
            timers,
            advance_timer: None,
            icon_timer: None,
            live: None,
            session_id: Uuid::new_v4(),
            event_bus,
            view_tx,
        };

        (engine, handle)
    }

    /// Build an engine and run it on the current tokio runtime
    pub fn spawn(engine: E, config: &PlayerConfig) -> (ReelHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(engine, config);
        let task = tokio::spawn(engine.run());
        (handle, task)
    }

    /// Process inputs until disposed or every handle is dropped
    pub async fn run(mut self) {
        info!("Reel engine started");

        loop {
            let input = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(input) => input,
                    None => {
                        debug!("All reel handles dropped; disposing");
                        ControllerInput::Dispose
                    }
                },
                Some(signal) = self.signals.recv() => match self.narration.accept(signal) {
                    Some(NarrationSignal::Started(handle)) => ControllerInput::NarrationStarted(handle),
                    Some(NarrationSignal::Ended(handle)) => ControllerInput::NarrationEnded(handle),
                    None => continue,
                },
                Some(fired) = self.timers.recv() => fired,
            };

            self.dispatch(input);

            if self.controller.is_disposed() {
                break;
            }
        }

        abort_timer(&mut self.advance_timer);
        abort_timer(&mut self.icon_timer);
        self.event_bus.emit_lossy(ReelEvent::Disposed {
            timestamp: chrono::Utc::now(),
        });
        info!("Reel engine stopped");
    }

    /// Feed one input through the controller and carry out its effects
    fn dispatch(&mut self, input: ControllerInput) {
        let before = self.controller.view();
        let mut pending = VecDeque::from([input]);

        while let Some(input) = pending.pop_front() {
            self.before_input(&input);
            for effect in self.controller.handle(input) {
                if let Some(follow_up) = self.apply(effect) {
                    pending.push_back(follow_up);
                }
            }
        }

        self.publish(before);
    }

    fn before_input(&mut self, input: &ControllerInput) {
        match input {
            ControllerInput::ReplaceReels(reels) => {
                self.session_id = Uuid::new_v4();
                self.live = None;
                info!("Reel set replaced: {} reels (session {})", reels.len(), self.session_id);
                self.event_bus.emit_lossy(ReelEvent::ReelSetLoaded {
                    session_id: self.session_id,
                    item_count: reels.len(),
                    timestamp: chrono::Utc::now(),
                });
            }
            ControllerInput::NarrationStarted(handle) => {
                if let Some(live) = self.live.as_ref().filter(|l| l.handle == *handle) {
                    self.event_bus.emit_lossy(ReelEvent::NarrationStarted {
                        index: live.index,
                        locale: live.locale.clone(),
                        timestamp: chrono::Utc::now(),
                    });
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, effect: Effect) -> Option<ControllerInput> {
        match effect {
            Effect::Speak {
                handle,
                index,
                text,
            } => match self.narration.speak(handle, &text) {
                Ok(locale) => {
                    self.live = Some(LiveUtterance {
                        handle,
                        index,
                        locale,
                    });
                    None
                }
                Err(e) => {
                    warn!("Narration unavailable for reel {}: {}", index, e);
                    self.live = None;
                    Some(ControllerInput::NarrationFailed(handle))
                }
            },
            Effect::CancelNarration => {
                self.narration.cancel();
                self.live = None;
                None
            }
            Effect::ScheduleAdvance { token, delay } => {
                abort_timer(&mut self.advance_timer);
                self.advance_timer = Some(self.arm(delay, ControllerInput::AdvanceElapsed(token)));
                None
            }
            Effect::CancelAdvance => {
                abort_timer(&mut self.advance_timer);
                None
            }
            Effect::ScheduleIconHide { token, delay } => {
                abort_timer(&mut self.icon_timer);
                self.icon_timer = Some(self.arm(delay, ControllerInput::IconElapsed(token)));
                None
            }
            Effect::CancelIconHide => {
                abort_timer(&mut self.icon_timer);
                None
            }
            Effect::ScrollTo(index) => {
                self.event_bus.emit_lossy(ReelEvent::ScrollRequested {
                    index,
                    timestamp: chrono::Utc::now(),
                });
                None
            }
            Effect::ShowEmptyState => {
                info!("No narratable reels in session {}", self.session_id);
                self.event_bus.emit_lossy(ReelEvent::NoNarratableContent {
                    session_id: self.session_id,
                    timestamp: chrono::Utc::now(),
                });
                None
            }
        }
    }

    /// Start a timer task that feeds `fire` back after `delay`
    fn arm(&self, delay: Duration, fire: ControllerInput) -> JoinHandle<()> {
        let tx = self.timer_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(fire);
        })
    }

    /// Push the new view and announce what changed
    fn publish(&mut self, before: ReelView) {
        let after = self.controller.view();
        if after == before {
            return;
        }
        self.view_tx.send_replace(after);

        let timestamp = chrono::Utc::now();
        if after.state != before.state {
            debug!("Playback state {} -> {}", before.state, after.state);
            self.event_bus.emit_lossy(ReelEvent::PlaybackStateChanged {
                old_state: before.state,
                new_state: after.state,
                timestamp,
            });
        }
        if after.active_index != before.active_index {
            let identity = after
                .active_index
                .and_then(|i| self.controller.reels().get(i))
                .map(|item| item.identity.clone());
            self.event_bus.emit_lossy(ReelEvent::ActiveReelChanged {
                index: after.active_index,
                identity,
                timestamp,
            });
        }
        if after.is_icon_visible != before.is_icon_visible {
            self.event_bus.emit_lossy(ReelEvent::IconVisibilityChanged {
                visible: after.is_icon_visible,
                timestamp,
            });
        }
    }
}

fn abort_timer(timer: &mut Option<JoinHandle<()>>) {
    if let Some(timer) = timer.take() {
        timer.abort();
    }
}

/// Cloneable front door to a running [`ReelEngine`]
///
/// Nothing here fails: once the engine has stopped, commands are dropped
/// and the last published view remains readable.
#[derive(Clone)]
pub struct ReelHandle {
    commands: mpsc::UnboundedSender<ControllerInput>,
    view: watch::Receiver<ReelView>,
    event_bus: EventBus,
}

impl ReelHandle {
    /// User tapped the reel
    pub fn toggle_play_pause(&self) {
        self.send(ControllerInput::TogglePlayPause);
    }

    /// Viewport tracker reports `index` as the visible reel
    pub fn on_scroll_to_index(&self, index: usize) {
        self.send(ControllerInput::Visible(index));
    }

    /// Install a new reel set (category or search change)
    pub fn replace_reels(&self, reels: ReelSet) {
        self.send(ControllerInput::ReplaceReels(reels));
    }

    /// Tear the engine down; later commands are ignored
    pub fn dispose(&self) {
        self.send(ControllerInput::Dispose);
    }

    /// Latest published view
    pub fn view(&self) -> ReelView {
        *self.view.borrow()
    }

    /// Receiver notified on every view change
    pub fn watch_view(&self) -> watch::Receiver<ReelView> {
        self.view.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReelEvent> {
        self.event_bus.subscribe()
    }

    fn send(&self, input: ControllerInput) {
        if self.commands.send(input).is_err() {
            debug!("Reel engine stopped; dropping command");
        }
    }
}

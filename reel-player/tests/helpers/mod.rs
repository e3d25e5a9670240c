//! Shared test helpers for reel-player integration tests
//!
//! - `FakeEngine`: scriptable narration engine that records every call
//! - `reel_set`: numbered reel sets
//! - `settle`: let the engine task drain its queues under a paused clock

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reel_common::{ReelEvent, ReelItem, ReelSet};
use reel_player::narration::{
    NarrationEngine, NarrationHandle, NarrationSignal, NarrationSignals, Utterance,
};
use reel_player::{Error, Result};
use tokio::sync::broadcast;

/// One call made against the fake engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Speak { handle: NarrationHandle, text: String, locale: String },
    Cancel,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<EngineCall>,
    current: Option<NarrationHandle>,
    signals: Option<NarrationSignals>,
    unavailable: bool,
    speak_attempts: usize,
}

/// Narration engine double
///
/// Clones share state, so the test keeps one clone while the engine owns
/// the other. `speak` reports `Started` immediately; `Ended` is only sent
/// when the test calls `finish`.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose every `speak` fails
    pub fn unavailable() -> Self {
        let engine = Self::default();
        engine.state.lock().unwrap().unavailable = true;
        engine
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Speak { text, .. } => Some(text),
                EngineCall::Cancel => None,
            })
            .collect()
    }

    pub fn speak_count(&self) -> usize {
        self.spoken_texts().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == EngineCall::Cancel).count()
    }

    pub fn speak_attempts(&self) -> usize {
        self.state.lock().unwrap().speak_attempts
    }

    /// Handle of the utterance the engine is currently speaking
    pub fn current(&self) -> Option<NarrationHandle> {
        self.state.lock().unwrap().current
    }

    /// Finish the current utterance; returns false if nothing was speaking
    pub fn finish(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match (state.current.take(), state.signals.as_ref()) {
            (Some(handle), Some(signals)) => signals.send(NarrationSignal::Ended(handle)).is_ok(),
            _ => false,
        }
    }

    /// Deliver an end signal for an arbitrary (possibly stale) utterance
    pub fn send_end(&self, handle: NarrationHandle) {
        let state = self.state.lock().unwrap();
        if let Some(signals) = state.signals.as_ref() {
            let _ = signals.send(NarrationSignal::Ended(handle));
        }
    }
}

impl NarrationEngine for FakeEngine {
    fn speak(&mut self, utterance: Utterance, signals: NarrationSignals) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.speak_attempts += 1;
        if state.unavailable {
            return Err(Error::NarrationUnavailable("speech synthesis not supported".to_string()));
        }

        let _ = signals.send(NarrationSignal::Started(utterance.handle));
        state.current = Some(utterance.handle);
        state.signals = Some(signals);
        state.calls.push(EngineCall::Speak {
            handle: utterance.handle,
            text: utterance.text,
            locale: utterance.locale,
        });
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.current = None;
        state.calls.push(EngineCall::Cancel);
        Ok(())
    }
}

/// Reel set of `count` numbered reels
pub fn reel_set(count: usize) -> ReelSet {
    ReelSet::new(
        (0..count)
            .map(|i| ReelItem {
                title: format!("Headline {}", i),
                narration_text: format!("Headline {}. Story {}", i, i),
                media_url: format!("https://img.example/{}.jpg", i),
                identity: format!("https://news.example/{}", i),
            })
            .collect(),
    )
}

/// Let the engine process everything queued (paused clock advances 1ms)
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Drain every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<ReelEvent>) -> Vec<ReelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

//! Narration engine adapter
//!
//! The controller depends only on the [`NarrationEngine`] capability, never
//! on a process-wide speech singleton. [`NarrationAdapter`] wraps an engine
//! and enforces the single-utterance rule:
//!
//! - a new `speak` cancels any utterance still in flight first
//! - `cancel` with nothing in flight is a no-op
//! - `Ended` is delivered at most once per `speak`, and never for an
//!   utterance that was cancelled or superseded

pub mod language;
pub mod simulated;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;

pub use language::detect_locale;
pub use simulated::SimulatedSpeech;

/// Identifies one `speak` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NarrationHandle(pub u64);

/// Progress reported by an engine for a given utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationSignal {
    Started(NarrationHandle),
    Ended(NarrationHandle),
}

/// Sender engines use to report progress back onto the engine queue
pub type NarrationSignals = mpsc::UnboundedSender<NarrationSignal>;

/// One request to speak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub handle: NarrationHandle,
    pub text: String,
    pub locale: String,
}

/// Text-to-speech capability
///
/// Implementations must not block: `speak` starts speech and returns,
/// reporting `Started`/`Ended` later through `signals`.
pub trait NarrationEngine: Send + 'static {
    fn speak(&mut self, utterance: Utterance, signals: NarrationSignals) -> Result<()>;

    fn cancel(&mut self) -> Result<()>;
}

pub struct NarrationAdapter<E: NarrationEngine> {
    engine: E,
    signals: NarrationSignals,
    default_locale: String,
    live: Option<NarrationHandle>,
}

impl<E: NarrationEngine> NarrationAdapter<E> {
    pub fn new(engine: E, signals: NarrationSignals, default_locale: impl Into<String>) -> Self {
        Self {
            engine,
            signals,
            default_locale: default_locale.into(),
            live: None,
        }
    }

    /// Handle of the utterance in flight, if any
    pub fn live(&self) -> Option<NarrationHandle> {
        self.live
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Start speaking `text`, cancelling any utterance still in flight
    ///
    /// Returns the locale chosen for the text.
    pub fn speak(&mut self, handle: NarrationHandle, text: &str) -> Result<String> {
        self.cancel();

        let locale = detect_locale(text)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_locale.clone());

        let utterance = Utterance {
            handle,
            text: text.to_string(),
            locale: locale.clone(),
        };
        self.engine.speak(utterance, self.signals.clone())?;
        self.live = Some(handle);
        debug!("Speaking {:?} ({})", handle, locale);
        Ok(locale)
    }

    /// Stop the utterance in flight; no-op when nothing is speaking
    pub fn cancel(&mut self) {
        if let Some(handle) = self.live.take() {
            debug!("Cancelling {:?}", handle);
            if let Err(e) = self.engine.cancel() {
                warn!("Narration cancel failed: {}", e);
            }
        }
    }

    /// Filter an engine signal
    ///
    /// Returns the signal if it belongs to the live utterance; signals for
    /// cancelled or superseded utterances are dropped.
    pub fn accept(&mut self, signal: NarrationSignal) -> Option<NarrationSignal> {
        match signal {
            NarrationSignal::Started(handle) if self.live == Some(handle) => Some(signal),
            NarrationSignal::Ended(handle) if self.live == Some(handle) => {
                self.live = None;
                Some(signal)
            }
            _ => {
                debug!("Dropping stale narration signal {:?}", signal);
                None
            }
        }
    }
}

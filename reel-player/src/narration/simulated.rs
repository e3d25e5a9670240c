//! Simulated speech engine
//!
//! Stands in for a platform synthesizer in the terminal driver: it logs the
//! utterance and reports it finished after the time a reader would need at
//! the configured speaking rate.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::{NarrationEngine, NarrationSignal, NarrationSignals, Utterance};
use crate::error::{Error, Result};

/// Shortest simulated utterance
const MIN_UTTERANCE: Duration = Duration::from_secs(1);

pub struct SimulatedSpeech {
    words_per_minute: u32,
    current: Option<JoinHandle<()>>,
}

impl SimulatedSpeech {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
            current: None,
        }
    }

    /// How long `text` takes to read aloud
    pub fn duration_for(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as u64;
        let millis = words * 60_000 / self.words_per_minute as u64;
        Duration::from_millis(millis).max(MIN_UTTERANCE)
    }
}

impl NarrationEngine for SimulatedSpeech {
    fn speak(&mut self, utterance: Utterance, signals: NarrationSignals) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::NarrationUnavailable(e.to_string()))?;

        if let Some(previous) = self.current.take() {
            previous.abort();
        }

        let duration = self.duration_for(&utterance.text);
        info!("Narrating [{}] {}", utterance.locale, utterance.text);

        let handle = utterance.handle;
        self.current = Some(runtime.spawn(async move {
            let _ = signals.send(NarrationSignal::Started(handle));
            tokio::time::sleep(duration).await;
            let _ = signals.send(NarrationSignal::Ended(handle));
        }));
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        if let Some(current) = self.current.take() {
            current.abort();
        }
        Ok(())
    }
}

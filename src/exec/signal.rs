// src/exec/signal.rs

//! One-shot completion signals for named graph tasks.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Fires once when its owning task finishes, however it finishes.
///
/// Single writer (the owning task, through [`PublishGuard`]), any number of
/// readers. The owner's failure text, if any, is written before the signal
/// fires so readers that observe the signal also observe the outcome.
#[derive(Debug, Default)]
pub(crate) struct CompletionSignal {
    fired: CancellationToken,
    failure: OnceLock<String>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait(&self) {
        self.fired.cancelled().await;
    }

    pub fn has_fired(&self) -> bool {
        self.fired.is_cancelled()
    }

    pub fn record_failure(&self, text: String) {
        let _ = self.failure.set(text);
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    fn fire(&self) {
        self.fired.cancel();
    }
}

/// Fires the owned signal when dropped.
///
/// Created before a node's worker future is built and moved into it, so the
/// signal also fires if the future is dropped without ever being polled.
#[derive(Debug)]
pub(crate) struct PublishGuard(Option<Arc<CompletionSignal>>);

impl PublishGuard {
    /// `None` for anonymous tasks, which nothing waits on.
    pub fn new(signal: Option<Arc<CompletionSignal>>) -> Self {
        Self(signal)
    }

    pub fn record_failure(&self, text: String) {
        if let Some(signal) = &self.0 {
            signal.record_failure(text);
        }
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        if let Some(signal) = self.0.take() {
            signal.fire();
        }
    }
}

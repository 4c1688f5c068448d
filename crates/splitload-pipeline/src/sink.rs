//! Outcome reporting
//!
//! The coordinator hands every outcome to an injected [`OutcomeSink`] the
//! moment it is produced, instead of writing to a process-wide logger.

use std::sync::{Mutex, PoisonError};

use splitload_core::{OutcomeStatus, UploadOutcome};

/// Receives one event per routed file.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, outcome: &UploadOutcome);
}

/// Emits each outcome as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn record(&self, outcome: &UploadOutcome) {
        let service = outcome.backend.display_name();
        match outcome.status {
            OutcomeStatus::Success => tracing::info!(
                file = %outcome.file_path.display(),
                backend = %outcome.backend,
                bucket = %outcome.bucket,
                "Successfully uploaded {} to {}'s {} bucket",
                outcome.remote_name,
                service,
                outcome.bucket
            ),
            OutcomeStatus::Failed => {
                let cause = outcome
                    .error
                    .as_ref()
                    .map(|detail| detail.message.as_str())
                    .unwrap_or("unknown error");
                tracing::error!(
                    file = %outcome.file_path.display(),
                    backend = %outcome.backend,
                    bucket = %outcome.bucket,
                    error = %cause,
                    "Error uploading {} to {}'s {} bucket: {}",
                    outcome.remote_name,
                    service,
                    outcome.bucket,
                    cause
                )
            }
        }
    }
}

/// Keeps every recorded outcome in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    outcomes: Mutex<Vec<UploadOutcome>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<UploadOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutcomeSink for MemorySink {
    fn record(&self, outcome: &UploadOutcome) {
        // A panic elsewhere while holding the lock leaves the list intact.
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome.clone());
    }
}

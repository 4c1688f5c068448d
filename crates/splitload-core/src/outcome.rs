//! Per-file upload outcomes

use std::path::PathBuf;

use serde::Serialize;

use crate::backend_kind::BackendKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// Why an upload failed, rendered at the point the error was caught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorDetail {
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Result of one routed file's upload attempt.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub file_path: PathBuf,
    pub remote_name: String,
    pub backend: BackendKind,
    pub bucket: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl UploadOutcome {
    pub fn success(
        file_path: PathBuf,
        remote_name: String,
        backend: BackendKind,
        bucket: String,
    ) -> Self {
        Self {
            file_path,
            remote_name,
            backend,
            bucket,
            status: OutcomeStatus::Success,
            error: None,
        }
    }

    pub fn failed(
        file_path: PathBuf,
        remote_name: String,
        backend: BackendKind,
        bucket: String,
        error: ErrorDetail,
    ) -> Self {
        Self {
            file_path,
            remote_name,
            backend,
            bucket,
            status: OutcomeStatus::Failed,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[UploadOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome.status {
                OutcomeStatus::Success => acc.succeeded += 1,
                OutcomeStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

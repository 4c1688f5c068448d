//! Storage abstraction trait
//!
//! This module defines the contract every upload destination implements and
//! the errors an upload can fail with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::BackendKind;

/// Why a single upload failed.
#[derive(Debug, Error)]
pub enum UploadCause {
    #[error("Failed to read local file {path}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote store rejected upload: {0}")]
    Remote(#[from] object_store::Error),

    #[error("Invalid object name: {0:?}")]
    InvalidName(String),

    #[error("Upload timed out after {0:?}")]
    TimedOut(Duration),
}

/// A failed upload, tagged with the backend that attempted it.
#[derive(Debug, Error)]
#[error("{backend} upload failed: {cause}")]
pub struct UploadError {
    pub backend: BackendKind,
    #[source]
    pub cause: UploadCause,
}

impl UploadError {
    pub fn new(backend: BackendKind, cause: UploadCause) -> Self {
        Self { backend, cause }
    }
}

/// Backend construction failure (bad credentials reference, invalid endpoint...).
#[derive(Debug, Error)]
#[error("Failed to configure {backend} backend: {message}")]
pub struct BuildError {
    pub backend: BackendKind,
    pub message: String,
}

/// Upload destination.
///
/// Implementations hold only immutable configuration and a client handle, so
/// one instance can serve many concurrent `upload` calls. Errors are returned
/// to the caller unchanged; backends never swallow them.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create or overwrite the object `remote_name` with the bytes of `local_path`.
    async fn upload(&self, local_path: &Path, remote_name: &str) -> Result<(), UploadError>;

    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Destination bucket, for reporting.
    fn bucket(&self) -> &str;
}

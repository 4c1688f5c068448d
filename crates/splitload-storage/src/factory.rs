use std::collections::HashMap;
use std::sync::Arc;

use splitload_core::Config;

use crate::{BackendKind, BuildError, GcsBackend, S3Backend, StorageBackend};

/// Backends available to a run, keyed by their identifier.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own [`StorageBackend::kind`], replacing
    /// any backend previously registered for that kind.
    pub fn with_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backends.insert(backend.kind(), backend);
        self
    }

    pub fn get(&self, kind: BackendKind) -> Option<&Arc<dyn StorageBackend>> {
        self.backends.get(&kind)
    }

    pub fn contains(&self, kind: BackendKind) -> bool {
        self.backends.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

/// Create every configured backend.
pub fn create_backends(config: &Config) -> Result<BackendRegistry, BuildError> {
    let s3 = S3Backend::new(&config.s3)?;
    tracing::info!(bucket = %config.s3.bucket, region = ?config.s3.region, "S3 backend ready");

    let gcs = GcsBackend::new(&config.gcs)?;
    tracing::info!(
        bucket = %config.gcs.bucket,
        project_id = %config.gcs.project_id,
        "GCS backend ready"
    );

    Ok(BackendRegistry::new()
        .with_backend(Arc::new(s3))
        .with_backend(Arc::new(gcs)))
}

//! Google Cloud Storage backend.
//!
//! Authenticates with a service-account credentials file. Uploading resolves
//! the bucket handle, then a blob reference for the remote name, and only then
//! transfers the file's bytes.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};
use splitload_core::GcsConfig;

use crate::keys::{object_location, read_local};
use crate::traits::{BuildError, StorageBackend, UploadCause, UploadError};
use crate::BackendKind;

/// Google Cloud Storage backend.
#[derive(Clone)]
pub struct GcsBackend {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    project_id: Option<String>,
}

/// Handle on the configured bucket.
struct BucketHandle<'a> {
    store: &'a Arc<dyn ObjectStore>,
    name: &'a str,
}

/// Reference to one object inside a bucket.
struct BlobRef<'a> {
    store: &'a Arc<dyn ObjectStore>,
    location: ObjectPath,
}

impl<'a> BucketHandle<'a> {
    fn blob(&self, remote_name: &str) -> Result<BlobRef<'a>, UploadCause> {
        Ok(BlobRef {
            store: self.store,
            location: object_location(remote_name)?,
        })
    }
}

impl BlobRef<'_> {
    async fn upload_from_file(&self, local_path: &Path) -> Result<u64, UploadCause> {
        let data = read_local(local_path).await?;
        let size = data.len() as u64;
        self.store.put(&self.location, PutPayload::from(data)).await?;
        Ok(size)
    }
}

impl GcsBackend {
    /// Create a new GCS backend.
    ///
    /// # Arguments
    /// * `config` - credentials file path, project id and bucket name
    pub fn new(config: &GcsConfig) -> Result<Self, BuildError> {
        if !config.credentials_path.is_file() {
            return Err(BuildError {
                backend: BackendKind::Gcs,
                message: format!(
                    "credentials file {} does not exist",
                    config.credentials_path.display()
                ),
            });
        }

        let store = GoogleCloudStorageBuilder::from_env()
            .with_service_account_path(config.credentials_path.to_string_lossy())
            .with_bucket_name(&config.bucket)
            .build()
            .map_err(|e| BuildError {
                backend: BackendKind::Gcs,
                message: e.to_string(),
            })?;

        Ok(Self::with_store(Arc::new(store), config.bucket.clone())
            .with_project_id(config.project_id.clone()))
    }

    /// Wrap an already-built object store.
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            project_id: None,
        }
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn bucket_handle(&self) -> BucketHandle<'_> {
        BucketHandle {
            store: &self.store,
            name: &self.bucket,
        }
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    async fn upload(&self, local_path: &Path, remote_name: &str) -> Result<(), UploadError> {
        let start = std::time::Instant::now();
        let bucket = self.bucket_handle();

        let result = match bucket.blob(remote_name) {
            Ok(blob) => blob.upload_from_file(local_path).await,
            Err(cause) => Err(cause),
        };

        let size = result.map_err(|cause| {
            tracing::debug!(
                error = %cause,
                bucket = %bucket.name,
                object = %remote_name,
                project_id = ?self.project_id,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GCS upload failed"
            );
            UploadError::new(BackendKind::Gcs, cause)
        })?;

        tracing::debug!(
            bucket = %bucket.name,
            object = %remote_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Gcs
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use splitload_core::ExtensionSet;

    #[tokio::test]
    async fn upload_creates_blob_named_after_remote_name() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("b.jpg");
        std::fs::write(&local, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let store = Arc::new(InMemory::new());
        let backend = GcsBackend::with_store(store.clone(), "media").with_project_id("demo");
        backend.upload(&local, "b.jpg").await.unwrap();

        let stored = store
            .get(&ObjectPath::from("b.jpg"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(backend.project_id(), Some("demo"));
    }

    #[tokio::test]
    async fn invalid_name_fails_before_reading_file() {
        let store = Arc::new(InMemory::new());
        let backend = GcsBackend::with_store(store, "media");

        let err = backend
            .upload(Path::new("/does/not/exist.jpg"), "")
            .await
            .unwrap_err();

        assert_eq!(err.backend, BackendKind::Gcs);
        assert!(matches!(err.cause, UploadCause::InvalidName(_)));
    }

    #[test]
    fn missing_credentials_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let config = GcsConfig {
            credentials_path: dir.path().join("service-account.json"),
            project_id: "demo".to_string(),
            bucket: "media".to_string(),
            extensions: ExtensionSet::parse_list("jpg"),
        };

        let err = GcsBackend::new(&config).err().unwrap();
        assert_eq!(err.backend, BackendKind::Gcs);
        assert!(err.message.contains("service-account.json"));
    }
}

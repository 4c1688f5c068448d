use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};
use splitload_core::S3Config;

use crate::keys::{object_location, read_local};
use crate::traits::{BuildError, StorageBackend, UploadCause, UploadError};
use crate::BackendKind;

/// S3 storage implementation
///
/// Objects are written straight into the configured bucket under the remote
/// name, with no key prefix.
#[derive(Clone)]
pub struct S3Backend {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Backend {
    /// Create a new S3Backend from its configuration section.
    ///
    /// Ambient `AWS_*` environment variables are read first and then
    /// overridden by the explicit key pair, bucket, region and endpoint.
    pub fn new(config: &S3Config) -> Result<Self, BuildError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key);

        if let Some(ref region) = config.region {
            builder = builder.with_region(region);
        }

        if let Some(ref endpoint) = config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder.build().map_err(|e| BuildError {
            backend: BackendKind::S3,
            message: e.to_string(),
        })?;

        Ok(Self::with_store(Arc::new(store), config.bucket.clone()))
    }

    /// Wrap an already-built object store (an S3-compatible client, or an
    /// in-memory store in tests).
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    async fn put_file(&self, local_path: &Path, remote_name: &str) -> Result<u64, UploadCause> {
        let location = object_location(remote_name)?;
        let data = read_local(local_path).await?;
        let size = data.len() as u64;

        self.store.put(&location, PutPayload::from(data)).await?;

        Ok(size)
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn upload(&self, local_path: &Path, remote_name: &str) -> Result<(), UploadError> {
        let start = std::time::Instant::now();

        let size = self.put_file(local_path, remote_name).await.map_err(|cause| {
            tracing::debug!(
                error = %cause,
                bucket = %self.bucket,
                key = %remote_name,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            UploadError::new(BackendKind::S3, cause)
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %remote_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::S3
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use splitload_core::ExtensionSet;

    fn in_memory() -> (Arc<InMemory>, S3Backend) {
        let store = Arc::new(InMemory::new());
        let backend = S3Backend::with_store(store.clone(), "documents");
        (store, backend)
    }

    #[tokio::test]
    async fn upload_round_trips_bytes_under_remote_name() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("nested").join("a.txt");
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(&local, b"quarterly numbers\n").unwrap();

        let (store, backend) = in_memory();
        backend.upload(&local, "a.txt").await.unwrap();

        let stored = store
            .get(&ObjectPath::from("a.txt"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"quarterly numbers\n");
    }

    #[tokio::test]
    async fn upload_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.txt");
        let (store, backend) = in_memory();

        std::fs::write(&local, b"v1").unwrap();
        backend.upload(&local, "a.txt").await.unwrap();
        std::fs::write(&local, b"version two").unwrap();
        backend.upload(&local, "a.txt").await.unwrap();

        let stored = store
            .get(&ObjectPath::from("a.txt"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"version two");
    }

    #[tokio::test]
    async fn missing_local_file_fails_with_backend_tag() {
        let dir = tempfile::tempdir().unwrap();
        let (_, backend) = in_memory();

        let err = backend
            .upload(&dir.path().join("gone.txt"), "gone.txt")
            .await
            .unwrap_err();

        assert_eq!(err.backend, BackendKind::S3);
        assert!(matches!(err.cause, UploadCause::LocalRead { .. }));
    }

    #[tokio::test]
    async fn object_keys_keep_reserved_characters() {
        use futures::TryStreamExt;

        let dir = tempfile::tempdir().unwrap();
        let (store, backend) = in_memory();
        for name in ["50%off.txt", "x[1]~#.txt"] {
            let local = dir.path().join(name);
            std::fs::write(&local, name).unwrap();
            backend.upload(&local, name).await.unwrap();
        }

        let mut keys: Vec<String> = store
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        keys.sort();
        assert_eq!(keys, vec!["50%off.txt", "x[1]~#.txt"]);

        let stored = store
            .get(&ObjectPath::parse("50%off.txt").unwrap())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"50%off.txt");
    }

    #[test]
    fn builds_from_config_without_network() {
        let config = S3Config {
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            bucket: "documents".to_string(),
            region: Some("eu-west-1".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            extensions: ExtensionSet::parse_list("txt"),
        };
        let backend = S3Backend::new(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::S3);
        assert_eq!(backend.bucket(), "documents");
    }
}

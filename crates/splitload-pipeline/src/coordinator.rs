//! Upload coordinator
//!
//! Drives the walker, routes each file and uploads it with the matching
//! backend. Per-file failures never escape [`UploadCoordinator::run`]: they
//! are converted into `Failed` outcomes and the batch continues. Outcomes are
//! not ordered, neither by walk order nor by backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future;
use futures::stream::{self, StreamExt};
use splitload_core::{
    BackendKind, ErrorDetail, RoutingTable, RunSummary, UploadOutcome, UploadSettings,
};
use splitload_storage::{BackendRegistry, StorageBackend, UploadCause, UploadError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::sink::OutcomeSink;
use crate::walker::{DirectoryWalker, WalkEntry, WalkError};

/// Walked entries buffered ahead of the uploads.
const WALK_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Routing table references backend {0}, but no such backend is registered")]
    MissingBackend(BackendKind),
}

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of uploads in flight. 1 processes files one after another.
    pub concurrency: usize,
    /// Per-file limit; an upload still running when it expires is recorded as failed.
    pub upload_timeout: Option<Duration>,
    /// Once cancelled, no further files are started.
    pub cancel: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            upload_timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl From<&UploadSettings> for RunOptions {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            concurrency: settings.concurrency,
            upload_timeout: settings.timeout,
            ..Self::default()
        }
    }
}

/// One routed file waiting to be uploaded.
struct UploadJob {
    local_path: PathBuf,
    remote_name: String,
    backend: Arc<dyn StorageBackend>,
}

pub struct UploadCoordinator {
    routing: RoutingTable,
    backends: BackendRegistry,
    sink: Arc<dyn OutcomeSink>,
    options: RunOptions,
}

impl UploadCoordinator {
    /// Build a coordinator. Every backend the routing table can select must be
    /// present in `backends`.
    pub fn new(
        routing: RoutingTable,
        backends: BackendRegistry,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, CoordinatorError> {
        if let Some(missing) = routing.backends().find(|kind| !backends.contains(*kind)) {
            return Err(CoordinatorError::MissingBackend(missing));
        }

        Ok(Self {
            routing,
            backends,
            sink,
            options: RunOptions::default(),
        })
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Upload every routable file under `root`.
    ///
    /// Returns the outcomes of all attempted uploads. Fails only when the root
    /// directory cannot be walked, in which case nothing is uploaded.
    ///
    /// The walk runs on the blocking pool and feeds entries through a bounded
    /// channel, so slow directory reads never stall in-flight uploads.
    pub async fn run(&self, root: &Path) -> Result<Vec<UploadOutcome>, WalkError> {
        let walker = DirectoryWalker::new(root);
        let entries = tokio::task::spawn_blocking(move || walker.walk()).await??;
        let start = Instant::now();

        tracing::info!(
            root = %root.display(),
            concurrency = self.options.concurrency,
            "Starting upload run"
        );

        let (tx, mut rx) = mpsc::channel(WALK_QUEUE_DEPTH);
        let feeder = tokio::task::spawn_blocking(move || {
            for entry in entries {
                // Receiver dropped: the run was cancelled.
                if tx.blocking_send(entry).is_err() {
                    break;
                }
            }
        });

        let cancel = self.options.cancel.clone();
        let mut uploads = stream::poll_fn(move |cx| rx.poll_recv(cx))
            .filter_map(|entry| future::ready(self.plan(entry)))
            .take_while(move |_| future::ready(!cancel.is_cancelled()))
            .map(|job| self.execute(job))
            .buffer_unordered(self.options.concurrency.max(1));

        let mut outcomes = Vec::new();
        while let Some(outcome) = uploads.next().await {
            self.sink.record(&outcome);
            outcomes.push(outcome);
        }
        drop(uploads);
        if let Err(e) = feeder.await {
            tracing::warn!(error = %e, "Directory walk stopped early");
        }

        let summary = RunSummary::from_outcomes(&outcomes);
        if self.options.cancel.is_cancelled() {
            tracing::warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Upload run cancelled before all files were processed"
            );
        }
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload run finished"
        );

        Ok(outcomes)
    }

    /// Route a walked file. Unmatched files produce no job and no outcome.
    fn plan(&self, entry: WalkEntry) -> Option<UploadJob> {
        let Some(kind) = self.routing.route(&entry.file_name) else {
            tracing::trace!(file = %entry.file_name, "No backend for file, skipping");
            return None;
        };

        // Guaranteed by `new`, which rejects tables naming unregistered backends.
        let backend = self.backends.get(kind)?.clone();

        Some(UploadJob {
            local_path: entry.path(),
            remote_name: entry.file_name,
            backend,
        })
    }

    async fn execute(&self, job: UploadJob) -> UploadOutcome {
        let kind = job.backend.kind();
        let attempt = job.backend.upload(&job.local_path, &job.remote_name);

        let result = match self.options.upload_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(UploadError::new(kind, UploadCause::TimedOut(limit))),
            },
            None => attempt.await,
        };

        let bucket = job.backend.bucket().to_string();
        match result {
            Ok(()) => UploadOutcome::success(job.local_path, job.remote_name, kind, bucket),
            Err(e) => UploadOutcome::failed(
                job.local_path,
                job.remote_name,
                kind,
                bucket,
                ErrorDetail::from_error(&e),
            ),
        }
    }
}

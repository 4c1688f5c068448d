//! Upload pipeline: walk → route → upload → record.
//!
//! [`UploadCoordinator::run`] walks a directory tree, routes every file by
//! extension through the [`RoutingTable`](splitload_core::RoutingTable),
//! uploads matched files with the selected backend and hands one
//! [`UploadOutcome`](splitload_core::UploadOutcome) per routed file to an
//! [`OutcomeSink`]. A failed upload is recorded and the run moves on; only an
//! inaccessible root directory aborts it.

pub mod coordinator;
pub mod sink;
pub mod walker;

pub use coordinator::{CoordinatorError, RunOptions, UploadCoordinator};
pub use sink::{MemorySink, OutcomeSink, TracingSink};
pub use walker::{DirectoryWalker, WalkEntry, WalkError};

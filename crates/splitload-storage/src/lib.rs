//! Splitload Storage Library
//!
//! This crate provides the [`StorageBackend`] trait and its two
//! implementations, [`S3Backend`] and [`GcsBackend`], both built on the
//! `object_store` crate.
//!
//! # Object naming
//!
//! The remote object name is used verbatim as the object key: uploading
//! `/data/reports/q1.txt` as `q1.txt` creates `q1.txt` at the root of the
//! bucket. No directory prefix is carried over from the local path.

pub mod factory;
pub(crate) mod keys;
pub mod gcs;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_backends, BackendRegistry};
pub use gcs::GcsBackend;
pub use s3::S3Backend;
pub use splitload_core::BackendKind;
pub use traits::{BuildError, StorageBackend, UploadCause, UploadError};

//! Splitload Core Library
//!
//! This crate provides the domain types shared by every splitload component:
//! backend identifiers, extension sets and the routing table, per-file upload
//! outcomes, and the configuration loaded from `config.ini`.

pub mod backend_kind;
pub mod config;
pub mod error;
pub mod extension;
pub mod outcome;
pub mod routing;

// Re-export commonly used types
pub use backend_kind::BackendKind;
pub use config::{Config, GcsConfig, S3Config, UploadSettings};
pub use error::ConfigError;
pub use extension::ExtensionSet;
pub use outcome::{ErrorDetail, OutcomeStatus, RunSummary, UploadOutcome};
pub use routing::{extension_of, RoutingTable};

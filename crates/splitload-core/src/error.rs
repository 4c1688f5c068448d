//! Configuration error types
//!
//! Every variant names the offending section and key so a broken
//! `config.ini` can be fixed from the message alone.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Missing configuration section [{0}]")]
    MissingSection(String),

    #[error("Missing required key `{key}` in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("Invalid value for `{key}` in section [{section}]: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    #[error("Extension `{extension}` is assigned to both [{first}] and [{second}]")]
    OverlappingExtension {
        extension: String,
        first: String,
        second: String,
    },
}

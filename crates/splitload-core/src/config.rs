//! Configuration module
//!
//! Loads the INI configuration file (`config.ini` by default) into one
//! immutable struct per backend plus the run settings. Required keys are
//! checked while loading and cross-section rules in [`Config::validate`], so a
//! bad file fails before any backend is built.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, Properties};

use crate::backend_kind::BackendKind;
use crate::error::ConfigError;
use crate::extension::ExtensionSet;
use crate::routing::RoutingTable;

const DEFAULT_CONCURRENCY: usize = 1;
const UPLOAD_SECTION: &str = "upload";

/// Credentials and addressing for the S3 backend.
#[derive(Clone)]
pub struct S3Config {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub extensions: ExtensionSet,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Credentials and addressing for the Google Cloud Storage backend.
#[derive(Clone, Debug)]
pub struct GcsConfig {
    pub credentials_path: PathBuf,
    pub project_id: String,
    pub bucket: String,
    pub extensions: ExtensionSet,
}

/// Settings that shape a run rather than a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSettings {
    pub concurrency: usize,
    pub timeout: Option<Duration>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: None,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub s3: S3Config,
    pub gcs: GcsConfig,
    pub upload: UploadSettings,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse and validate configuration held in memory.
    pub fn from_ini_str(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let s3 = section(ini, BackendKind::S3.config_section())?;
        let gcs = section(ini, BackendKind::Gcs.config_section())?;

        let config = Config {
            s3: S3Config {
                access_key: required(s3, "s3", "access_key")?,
                secret_key: required(s3, "s3", "secret_key")?,
                bucket: required(s3, "s3", "bucket_name")?,
                region: optional(s3, "region"),
                endpoint: optional(s3, "endpoint"),
                extensions: extensions(s3, "s3")?,
            },
            gcs: GcsConfig {
                credentials_path: PathBuf::from(required(gcs, "gcs", "credentials_path")?),
                project_id: required(gcs, "gcs", "project_id")?,
                bucket: required(gcs, "gcs", "bucket_name")?,
                extensions: extensions(gcs, "gcs")?,
            },
            upload: match ini.section(Some(UPLOAD_SECTION)) {
                Some(props) => upload_settings(props)?,
                None => UploadSettings::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-section checks.
    ///
    /// An extension may belong to one backend only; the router would
    /// otherwise send it to whichever backend is declared first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(extension) = self.s3.extensions.overlap(&self.gcs.extensions).next() {
            return Err(ConfigError::OverlappingExtension {
                extension: extension.to_string(),
                first: BackendKind::S3.config_section().to_string(),
                second: BackendKind::Gcs.config_section().to_string(),
            });
        }

        if self.upload.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                section: UPLOAD_SECTION.to_string(),
                key: "concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.upload.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                section: UPLOAD_SECTION.to_string(),
                key: "timeout_secs".to_string(),
                message: "must be at least 1 second; omit the key for no timeout".to_string(),
            });
        }

        Ok(())
    }

    /// Routing table in fixed priority order: S3 first, then GCS.
    pub fn routing_table(&self) -> RoutingTable {
        RoutingTable::new()
            .with_route(BackendKind::S3, self.s3.extensions.clone())
            .with_route(BackendKind::Gcs, self.gcs.extensions.clone())
    }

    pub fn bucket(&self, backend: BackendKind) -> &str {
        match backend {
            BackendKind::S3 => &self.s3.bucket,
            BackendKind::Gcs => &self.gcs.bucket,
        }
    }
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties, ConfigError> {
    ini.section(Some(name))
        .ok_or_else(|| ConfigError::MissingSection(name.to_string()))
}

fn optional(props: &Properties, key: &str) -> Option<String> {
    props
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

fn required(props: &Properties, section: &str, key: &str) -> Result<String, ConfigError> {
    optional(props, key).ok_or_else(|| ConfigError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn extensions(props: &Properties, section: &str) -> Result<ExtensionSet, ConfigError> {
    let set = ExtensionSet::parse_list(&required(props, section, "extensions")?);
    if set.is_empty() {
        return Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: "extensions".to_string(),
            message: "list contains no extensions".to_string(),
        });
    }
    Ok(set)
}

fn upload_settings(props: &Properties) -> Result<UploadSettings, ConfigError> {
    let concurrency = match optional(props, "concurrency") {
        Some(raw) => parse_number(&raw, "concurrency")?,
        None => DEFAULT_CONCURRENCY as u64,
    };
    let timeout = optional(props, "timeout_secs")
        .map(|raw| parse_number(&raw, "timeout_secs"))
        .transpose()?
        .map(Duration::from_secs);

    Ok(UploadSettings {
        concurrency: concurrency as usize,
        timeout,
    })
}

fn parse_number(raw: &str, key: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        section: UPLOAD_SECTION.to_string(),
        key: key.to_string(),
        message: format!("expected a non-negative integer, got `{}`", raw),
    })
}

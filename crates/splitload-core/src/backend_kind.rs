use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ConfigError;

/// Remote storage backend identifiers
///
/// The set is closed: adding a destination means adding a variant here, a
/// routing table entry and a factory arm in `splitload-storage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    S3,
    Gcs,
}

impl BackendKind {
    /// Human readable service name used in outcome reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::S3 => "AWS S3",
            BackendKind::Gcs => "Google Cloud Storage",
        }
    }

    /// Name of the configuration section that describes this backend.
    pub fn config_section(&self) -> &'static str {
        match self {
            BackendKind::S3 => "s3",
            BackendKind::Gcs => "gcs",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(BackendKind::S3),
            "gcs" => Ok(BackendKind::Gcs),
            _ => Err(ConfigError::InvalidValue {
                section: "backend".to_string(),
                key: "kind".to_string(),
                message: format!("unknown storage backend: {}", s),
            }),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Gcs => write!(f, "gcs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("S3".parse::<BackendKind>().unwrap(), BackendKind::S3);
        assert_eq!("gcs".parse::<BackendKind>().unwrap(), BackendKind::Gcs);
        assert!("azure".parse::<BackendKind>().is_err());
    }

    #[test]
    fn display_matches_config_section() {
        for kind in [BackendKind::S3, BackendKind::Gcs] {
            assert_eq!(kind.to_string(), kind.config_section());
        }
    }
}

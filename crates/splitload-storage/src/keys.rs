//! Shared object naming and local reads for storage backends.

use std::path::Path;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;

use crate::traits::UploadCause;

/// Object location for a remote name. The name is used as-is, without any
/// prefix or percent-encoding; empty names, `.`, `..`, names containing `/`
/// and names with control characters are rejected.
pub fn object_location(remote_name: &str) -> Result<ObjectPath, UploadCause> {
    let invalid = || UploadCause::InvalidName(remote_name.to_string());
    if remote_name.is_empty() || remote_name.contains('/') {
        return Err(invalid());
    }
    // `Path::from` would percent-encode characters such as `%` and `#`.
    ObjectPath::parse(remote_name).map_err(|_| invalid())
}

/// Read the whole local file into memory.
pub async fn read_local(local_path: &Path) -> Result<Bytes, UploadCause> {
    tokio::fs::read(local_path)
        .await
        .map(Bytes::from)
        .map_err(|source| UploadCause::LocalRead {
            path: local_path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_used_verbatim() {
        let location = object_location("report.txt").unwrap();
        assert_eq!(location.to_string(), "report.txt");
    }

    #[test]
    fn reserved_characters_are_not_encoded() {
        for name in ["50%off.txt", "x[1]~#.txt", "a b{c}^|.csv"] {
            let location = object_location(name).unwrap();
            assert_eq!(location.to_string(), name);
        }
    }

    #[test]
    fn rejects_empty_and_nested_names() {
        for name in ["", "a/b.txt", ".", "..", "bell\u{7}.txt"] {
            assert!(matches!(
                object_location(name),
                Err(UploadCause::InvalidName(_))
            ));
        }
    }

    #[tokio::test]
    async fn missing_local_file_is_local_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_local(&dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, UploadCause::LocalRead { .. }));
    }
}

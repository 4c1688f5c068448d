//! Recursive directory traversal.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Root directory {path} is not accessible: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Root path {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Directory walk task failed: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// A regular file found under the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub directory: PathBuf,
    pub file_name: String,
}

impl WalkEntry {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Lazily enumerates regular files below a root directory.
///
/// Symbolic links to regular files are yielded under the link's own name.
/// Links to directories are never descended, so link cycles cannot cause
/// unbounded recursion. Entries that cannot be read, dangling links, and file
/// names that are not valid UTF-8 are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start the walk. Fails only when the root itself cannot be listed.
    pub fn walk(&self) -> Result<impl Iterator<Item = WalkEntry>, WalkError> {
        let inaccessible = |source| WalkError::Inaccessible {
            path: self.root.clone(),
            source,
        };

        let metadata = std::fs::metadata(&self.root).map_err(inaccessible)?;
        if !metadata.is_dir() {
            return Err(WalkError::NotADirectory(self.root.clone()));
        }
        std::fs::read_dir(&self.root).map_err(inaccessible)?;

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(is_file_or_file_link)
            .filter_map(|entry| {
                let file_name = match entry.file_name().to_str() {
                    Some(name) => name.to_string(),
                    None => {
                        tracing::debug!(
                            path = %entry.path().display(),
                            "Skipping non UTF-8 file name"
                        );
                        return None;
                    }
                };
                let directory = entry.path().parent()?.to_path_buf();
                Some(WalkEntry {
                    directory,
                    file_name,
                })
            });

        Ok(entries)
    }
}

fn is_file_or_file_link(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match std::fs::metadata(entry.path()) {
        Ok(target) => target.is_file(),
        Err(e) => {
            tracing::debug!(
                path = %entry.path().display(),
                error = %e,
                "Skipping dangling symlink"
            );
            false
        }
    }
}

//! Error types for the file-store collaborator

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reported by a [`FileStore`](crate::FileStore).
///
/// These never cross the manager's public boundary; finalization failures are
/// absorbed there. The variants exist so store implementations and the
/// manager can tell "nothing to delete" apart from real trouble.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no file at {0}")]
    NotFound(PathBuf),

    #[error("permission denied for {0}")]
    PermissionDenied(PathBuf),

    #[error("file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("io error on {path}: {source}")]
    Other {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Classify an `io::Error` for `path` into the store taxonomy.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Other {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

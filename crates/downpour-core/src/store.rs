//! File-store collaborator
//!
//! Filesystem primitives the manager uses to finalize downloads: delete,
//! move-or-copy, whole-file write, and destination path resolution. The
//! trait keeps the manager testable; [`LocalFileStore`] is the shipped
//! implementation rooted at a base directory.

use crate::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage collaborator providing atomic file operations by path.
pub trait FileStore: Send + Sync {
    /// Remove the file at `path`. Fails with [`StoreError::NotFound`] when
    /// there is nothing to remove.
    fn delete_if_exists(&self, path: &Path) -> Result<(), StoreError>;

    /// Move `source` to `dest`, copying across filesystems when a rename is
    /// not possible. Fails with [`StoreError::AlreadyExists`] when `dest` is
    /// occupied; callers delete first.
    fn move_or_copy(&self, source: &Path, dest: &Path) -> Result<(), StoreError>;

    /// Replace the contents of `path` with `data`.
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError>;

    /// Build a destination path under the store's base directory:
    /// `base/dir…/name[.extension]`. Returns `None` when the store has no
    /// usable base directory.
    fn resolve_path(&self, directories: &[&str], name: &str, extension: &str) -> Option<PathBuf>;
}

/// [`FileStore`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Store rooted at the platform documents directory, when one exists.
    pub fn in_documents() -> Option<Self> {
        dirs::document_dir().map(Self::new)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl FileStore for LocalFileStore {
    fn delete_if_exists(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_file(path).map_err(|e| StoreError::from_io(path, e))
    }

    fn move_or_copy(&self, source: &Path, dest: &Path) -> Result<(), StoreError> {
        if dest.exists() {
            return Err(StoreError::AlreadyExists(dest.to_path_buf()));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::from_io(parent, e))?;
        }
        match fs::rename(source, dest) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename fails across mount points; fall back to copy.
                fs::copy(source, dest).map_err(|e| StoreError::from_io(dest, e))?;
                if let Err(e) = fs::remove_file(source) {
                    tracing::warn!(source = %source.display(), error = %e, "leftover temp file after copy");
                }
                Ok(())
            }
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        fs::write(path, data).map_err(|e| StoreError::from_io(path, e))
    }

    fn resolve_path(&self, directories: &[&str], name: &str, extension: &str) -> Option<PathBuf> {
        let mut path = self.base_dir.clone();
        for dir in directories {
            path.push(dir);
        }
        // Appended, not swapped in: a dotted name keeps its existing suffix.
        if extension.is_empty() {
            path.push(name);
        } else {
            path.push(format!("{name}.{extension}"));
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());
        let err = store
            .delete_if_exists(&dir.path().join("nope.bin"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());
        let path = dir.path().join("a.bin");
        store.write(&path, b"payload").unwrap();
        store.delete_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn move_or_copy_refuses_occupied_destination() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("dest.bin");
        store.write(&src, b"new").unwrap();
        store.write(&dest, b"old").unwrap();
        let err = store.move_or_copy(&src, &dest).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        // Neither side is touched.
        assert_eq!(fs::read(&dest).unwrap(), b"old");
        assert!(src.exists());
    }

    #[test]
    fn move_or_copy_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("sub").join("dest.bin");
        store.write(&src, b"payload").unwrap();
        store.move_or_copy(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
        assert!(!src.exists());
    }

    #[test]
    fn resolve_path_joins_directories_and_extension() {
        let store = LocalFileStore::new(PathBuf::from("/docs"));
        let path = store.resolve_path(&["bundles", "v2"], "app", "bin").unwrap();
        assert_eq!(path, PathBuf::from("/docs/bundles/v2/app.bin"));
    }

    #[test]
    fn resolve_path_appends_extension_to_dotted_name() {
        let store = LocalFileStore::new(PathBuf::from("/docs"));
        let path = store.resolve_path(&[], "archive.tar", "gz").unwrap();
        assert_eq!(path, PathBuf::from("/docs/archive.tar.gz"));
    }

    #[test]
    fn resolve_path_without_extension() {
        let store = LocalFileStore::new(PathBuf::from("/docs"));
        let path = store.resolve_path(&[], "app", "").unwrap();
        assert_eq!(path, PathBuf::from("/docs/app"));
    }
}

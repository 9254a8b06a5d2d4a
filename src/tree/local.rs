//! Local filesystem collaborators backed by `tokio::fs`
//!
//! Symlinks are never followed: a symlink (or any other non-directory
//! entry) is reported as a file sized by its own `lstat` length.

use crate::error::{FsError, FsResult};
use crate::tree::{Directory, File, Listing};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDir {
    path: PathBuf,
}

impl LocalDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Directory for LocalDir {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn list(&self, cancel: &CancellationToken) -> FsResult<Listing> {
        let mut read_dir = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|e| FsError::from_io(&self.path, e))?;

        let mut listing = Listing::default();

        loop {
            // Never hand back a partial listing
            if cancel.is_cancelled() {
                return Err(FsError::Cancelled {
                    path: self.path.clone(),
                });
            }

            let entry = match read_dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(FsError::ReadDirFailed {
                        path: self.path.clone(),
                        reason: e.to_string(),
                    })
                }
            };

            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| FsError::from_io(&path, e))?;

            if file_type.is_dir() {
                listing.dirs.push(Box::new(LocalDir::new(path)));
            } else {
                listing.files.push(Box::new(LocalFile::new(path)));
            }
        }

        trace!(
            path = %self.path.display(),
            dirs = listing.dirs.len(),
            files = listing.files.len(),
            "Listed local directory"
        );

        Ok(listing)
    }
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl File for LocalFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn stat(&self, _cancel: &CancellationToken) -> FsResult<u64> {
        let metadata = tokio::fs::symlink_metadata(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    FsError::from_io(&self.path, e)
                }
                _ => FsError::StatFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                },
            })?;

        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_list_splits_dirs_and_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let root = LocalDir::new(dir.path());
        let listing = root.list(&CancellationToken::new()).await.unwrap();

        assert_eq!(listing.dirs.len(), 1);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.dirs[0].path(), dir.path().join("sub"));

        let size = listing.files[0].stat(&CancellationToken::new()).await.unwrap();
        assert_eq!(size, 5);
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = LocalDir::new(&missing)
            .list(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, FsError::NotFound { path: missing });
    }

    #[tokio::test]
    async fn test_stat_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.bin");

        let err = LocalFile::new(&missing)
            .stat(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_cancelled_is_error_not_partial() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}")), b"data").unwrap();
        }

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = LocalDir::new(dir.path()).list(&cancel).await.unwrap_err();
        assert_eq!(
            err,
            FsError::Cancelled {
                path: dir.path().to_path_buf()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_directory_is_empty_listing() {
        let dir = tempdir().unwrap();
        let listing = LocalDir::new(dir.path())
            .list(&CancellationToken::new())
            .await
            .unwrap();
        assert!(listing.is_empty());
    }
}

//! Local filesystem storage.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::result::AppResult;

/// Local filesystem storage rooted at a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Root directory for all tenant folders.
    root: PathBuf,
}

impl LocalStorage {
    /// Create storage rooted at the given path, creating it if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path within the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Create a new file for writing. Fails if anything already exists at
    /// the destination.
    pub async fn create_exclusive(&self, path: &str) -> AppResult<(PathBuf, fs::File)> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
            .map_err(|e| {
                let message = if e.kind() == io::ErrorKind::AlreadyExists {
                    format!("Destination already exists: {path}")
                } else {
                    format!("Failed to create file: {path}")
                };
                AppError::with_source(ErrorKind::Storage, message, e)
            })?;

        debug!(path, "Created destination file");
        Ok((full_path, file))
    }

    /// Read up to `limit` leading bytes of a file.
    pub async fn read_head(&self, full_path: &Path, limit: usize) -> AppResult<Vec<u8>> {
        let file = fs::File::open(full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to open file: {}", full_path.display()),
                e,
            )
        })?;
        let mut head = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64)
            .read_to_end(&mut head)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read file head", e))?;
        Ok(head)
    }

    /// Delete a file by absolute path. Missing files are not an error.
    /// Returns whether a file was removed.
    pub async fn delete(&self, full_path: &Path) -> AppResult<bool> {
        match fs::remove_file(full_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {}", full_path.display()),
                e,
            )),
        }
    }

    /// Delete a file, logging instead of failing.
    pub async fn delete_best_effort(&self, full_path: &Path) {
        if let Err(e) = self.delete(full_path).await {
            warn!(path = %full_path.display(), error = %e, "Best-effort delete failed");
        }
    }
}

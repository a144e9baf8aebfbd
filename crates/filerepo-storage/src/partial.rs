//! Drop guard for a destination file that has not been committed yet.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Owns an in-progress destination file.
///
/// Until [`PartialFile::commit`] is called the file is considered partial
/// and is removed when the guard is discarded or dropped, including when the
/// owning future is cancelled mid-write.
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    /// Take ownership of a freshly created file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }

    /// Remove the file now.
    pub async fn discard(mut self) {
        self.committed = true;
        remove_quietly(tokio::fs::remove_file(&self.path).await, &self.path);
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            // Drop cannot await; the unlink is a single short syscall.
            remove_quietly(std::fs::remove_file(&self.path), &self.path);
        }
    }
}

fn remove_quietly(result: io::Result<()>, path: &Path) {
    match result {
        Ok(()) => debug!(path = %path.display(), "Removed partial file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial file"),
    }
}

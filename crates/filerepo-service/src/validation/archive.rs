//! Recursive nested-archive depth inspection.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

/// Extensions treated as archives, both for top-level uploads and for
/// entries inside an archive.
const ARCHIVE_EXTENSIONS: &[&str] = &[".zip"];

/// Outcome of a failed inspection.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An archive nests deeper than the permitted depth.
    #[error("nested archive depth exceeded")]
    DepthExceeded,

    /// The file, a nested entry, or an entry's compressed data is not
    /// a readable zip archive.
    #[error("invalid archive: {0}")]
    Invalid(String),

    /// A local filesystem failure while inspecting.
    #[error("archive inspection I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<ZipError> for ArchiveError {
    fn from(err: ZipError) -> Self {
        match err {
            // Truncated or undecodable structure surfaces as io errors too.
            ZipError::Io(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
                ) =>
            {
                Self::Invalid(e.to_string())
            }
            ZipError::Io(e) => Self::Io(e),
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Whether a normalized extension (or an entry name) denotes an archive.
pub fn is_archive_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Verifies that archives nest no deeper than a tenant's limit.
///
/// A depth of 0 permits no nested archive at all. Each nested archive is
/// extracted to its own temporary file, inspected with one less level of
/// allowance, and removed afterwards whatever the outcome.
///
/// `entry_limit` caps the decompressed size of each extracted nested
/// archive. An entry that inflates past it is treated as invalid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDepthInspector;

impl ZipDepthInspector {
    /// Inspect the archive at `path`. Blocking; run on a worker thread.
    pub fn inspect(
        &self,
        path: &Path,
        max_depth: u32,
        entry_limit: Option<u64>,
    ) -> Result<(), ArchiveError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() || !is_archive_name(entry.name()) {
                continue;
            }

            if max_depth == 0 {
                debug!(entry = entry.name(), "Nested archive found with no depth allowance");
                return Err(ArchiveError::DepthExceeded);
            }

            let mut nested = tempfile::NamedTempFile::new()?;
            extract_entry(&mut entry, nested.as_file_mut(), entry_limit)?;
            // `nested` is removed on drop, after the recursive result is known.
            self.inspect(nested.path(), max_depth - 1, entry_limit)?;
        }

        Ok(())
    }
}

/// Copy one entry's decompressed bytes into `dest`.
///
/// Read failures come from the archive itself (bad CRC, corrupt deflate
/// stream) and are classified as invalid. Write failures are local I/O.
fn extract_entry(
    entry: impl Read,
    dest: &mut File,
    limit: Option<u64>,
) -> Result<u64, ArchiveError> {
    let mut reader = entry.take(limit.map_or(u64::MAX, |l| l.saturating_add(1)));
    let mut buf = [0u8; 8192];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::Invalid(format!("unreadable entry: {e}"))),
        };
        written += n as u64;
        if limit.is_some_and(|l| written > l) {
            return Err(ArchiveError::Invalid("entry exceeds size limit".into()));
        }
        dest.write_all(&buf[..n])?;
    }

    Ok(written)
}

//! Ingestion pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings governing how uploads are streamed, locked, and inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Size of each chunk written to disk (default 1 MiB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,
    /// Upper bound on the wait for the next chunk from the caller.
    #[serde(default = "default_chunk_read_timeout")]
    pub chunk_read_timeout_seconds: u64,
    /// Lifetime of an upload lock before it self-expires.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    /// Maximum length of a sanitized file name.
    #[serde(default = "default_max_filename_length")]
    pub max_filename_length: usize,
    /// Reject uploads when archive inspection hits an unexpected I/O error.
    ///
    /// `false` keeps the historical fail-open behaviour.
    #[serde(default)]
    pub archive_fail_closed: bool,
    /// Number of leading bytes read for magic-byte sniffing.
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,
}

impl UploadConfig {
    /// Per-chunk read timeout as a [`Duration`].
    pub fn chunk_read_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_read_timeout_seconds)
    }

    /// Lock TTL as a [`Duration`].
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            chunk_read_timeout_seconds: default_chunk_read_timeout(),
            lock_ttl_seconds: default_lock_ttl(),
            max_filename_length: default_max_filename_length(),
            archive_fail_closed: false,
            sniff_bytes: default_sniff_bytes(),
        }
    }
}

fn default_chunk_size() -> usize {
    1_048_576 // 1 MiB
}

fn default_chunk_read_timeout() -> u64 {
    30
}

fn default_lock_ttl() -> u64 {
    30
}

fn default_max_filename_length() -> usize {
    200
}

fn default_sniff_bytes() -> usize {
    8192
}

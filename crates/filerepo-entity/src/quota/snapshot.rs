//! Quota snapshot value objects.

use serde::{Deserialize, Serialize};

use crate::tenant::TenantConfig;

/// Aggregate usage for one tenant as reported by the metadata store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of stored files.
    pub file_count: u64,
    /// Sum of stored file sizes in bytes.
    pub total_bytes: u64,
}

/// Point-in-time usage compared against a tenant's limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Number of stored files.
    pub file_count: u64,
    /// Sum of stored file sizes in bytes.
    pub total_bytes: u64,
    /// Storage quota in bytes (None = unlimited).
    pub storage_quota_bytes: Option<u64>,
    /// File count limit (None = unlimited).
    pub file_count_limit: Option<u64>,
    /// Usage has not gone past the storage quota.
    pub within_storage_quota: bool,
    /// Usage has not gone past the file count limit.
    pub within_file_count_quota: bool,
    /// Storage usage percentage (None if unlimited or zero).
    pub storage_usage_percent: Option<f64>,
    /// File count usage percentage (None if unlimited or zero).
    pub file_count_usage_percent: Option<f64>,
}

/// Usage percentage; `None` when the limit is unset or zero.
fn percent(used: u64, limit: Option<u64>) -> Option<f64> {
    limit
        .filter(|l| *l > 0)
        .map(|l| (used as f64 / l as f64) * 100.0)
}

impl QuotaSnapshot {
    /// Combine aggregate usage with the tenant's configured limits.
    pub fn new(stats: AggregateStats, config: &TenantConfig) -> Self {
        let storage_quota_bytes = config.storage_quota_bytes;
        let file_count_limit = config.file_count_limit;
        Self {
            file_count: stats.file_count,
            total_bytes: stats.total_bytes,
            storage_quota_bytes,
            file_count_limit,
            within_storage_quota: storage_quota_bytes.is_none_or(|q| stats.total_bytes <= q),
            within_file_count_quota: file_count_limit.is_none_or(|l| stats.file_count <= l),
            storage_usage_percent: percent(stats.total_bytes, storage_quota_bytes),
            file_count_usage_percent: percent(stats.file_count, file_count_limit),
        }
    }

    /// Whether one more file may be stored.
    pub fn has_room_for_file(&self) -> bool {
        self.file_count_limit.is_none_or(|l| self.file_count < l)
    }

    /// Whether `additional_bytes` more may be stored.
    pub fn has_room_for_bytes(&self, additional_bytes: u64) -> bool {
        self.storage_quota_bytes
            .is_none_or(|q| self.total_bytes.saturating_add(additional_bytes) <= q)
    }
}

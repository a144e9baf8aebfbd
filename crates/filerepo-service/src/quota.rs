//! Quota Ledger: a tenant's aggregate usage compared to its limits.
//!
//! Admission uses a snapshot taken before any bytes are written and is not
//! re-verified after the write. Two concurrent uploads with different
//! filenames for the same tenant can therefore both pass and jointly
//! overshoot a limit.

use std::sync::Arc;

use tracing::debug;

use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_database::MetadataStore;
use filerepo_entity::quota::{QuotaKind, QuotaSnapshot};

use crate::context::TenantContext;

/// Computes quota snapshots and admission decisions.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    store: Arc<dyn MetadataStore>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Current usage of the tenant against its configured limits.
    pub async fn snapshot(&self, ctx: &TenantContext) -> AppResult<QuotaSnapshot> {
        let stats = self.store.aggregate_stats(ctx.tenant_id).await?;
        Ok(QuotaSnapshot::new(stats, &ctx.config))
    }

    /// Take a snapshot and reject when the tenant has no room for another file.
    pub async fn admit(&self, ctx: &TenantContext) -> AppResult<QuotaSnapshot> {
        let snapshot = self.snapshot(ctx).await?;
        debug!(
            tenant_id = %ctx.tenant_id,
            file_count = snapshot.file_count,
            total_bytes = snapshot.total_bytes,
            "Quota admission check"
        );

        if !snapshot.has_room_for_file() {
            return Err(AppError::quota_exceeded(
                QuotaKind::FileCount,
                "File count quota exceeded",
            ));
        }
        if !snapshot.has_room_for_bytes(1) {
            return Err(AppError::quota_exceeded(
                QuotaKind::Storage,
                "Storage quota exceeded",
            ));
        }
        Ok(snapshot)
    }

    /// Check bytes received so far against the admission snapshot.
    pub fn check_streamed(snapshot: &QuotaSnapshot, bytes_so_far: u64) -> AppResult<()> {
        if snapshot.has_room_for_bytes(bytes_so_far) {
            Ok(())
        } else {
            Err(AppError::quota_exceeded(
                QuotaKind::Storage,
                "Storage quota exceeded",
            ))
        }
    }
}

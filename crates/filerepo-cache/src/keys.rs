//! Cache key builders for all FileRepo cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Backend-level namespacing
//! (the Redis key prefix) is applied by the provider, not here.

use uuid::Uuid;

// ── File keys ──────────────────────────────────────────────

/// Cache key for a tenant's file listing.
pub fn files_list(tenant_id: Uuid) -> String {
    format!("files:list:{tenant_id}")
}

/// Cache key for a single file record.
pub fn file_detail(tenant_id: Uuid, file_id: &str) -> String {
    format!("files:detail:{tenant_id}:{file_id}")
}

// ── Tenant keys ────────────────────────────────────────────

/// Cache key for a tenant resolved by code.
pub fn tenant_by_code(tenant_code: &str) -> String {
    format!("tenant:cfg:{tenant_code}")
}

// ── Upload lock keys ───────────────────────────────────────

/// Cache key for the per-(tenant, filename) upload lock.
pub fn upload_lock(tenant_id: Uuid, file_name: &str) -> String {
    format!("upload:lock:{tenant_id}:{file_name}")
}

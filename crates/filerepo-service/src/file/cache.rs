//! Read-through cache for file details and per-tenant file lists.
//!
//! Every operation degrades gracefully: cache failures are logged and
//! treated as a miss, never surfaced to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use filerepo_cache::CacheManager;
use filerepo_cache::keys;
use filerepo_core::config::CacheConfig;
use filerepo_core::traits::cache::CacheProvider;
use filerepo_entity::file::{FileId, FileRecord};

#[derive(Debug, Clone)]
pub struct FileCache {
    cache: Arc<CacheManager>,
    list_ttl: Duration,
    detail_ttl: Duration,
}

impl FileCache {
    pub fn new(cache: Arc<CacheManager>, config: &CacheConfig) -> Self {
        Self {
            cache,
            list_ttl: Duration::from_secs(config.file_list_ttl_seconds),
            detail_ttl: Duration::from_secs(config.file_detail_ttl_seconds),
        }
    }

    pub async fn get_detail(&self, tenant_id: Uuid, file_id: &FileId) -> Option<FileRecord> {
        let key = keys::file_detail(tenant_id, file_id.as_str());
        match self.cache.get_json::<FileRecord>(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "File detail cache read failed");
                None
            }
        }
    }

    pub async fn put_detail(&self, record: &FileRecord) {
        let key = keys::file_detail(record.tenant_id(), record.file_id().as_str());
        if let Err(e) = self.cache.set_json(&key, record, self.detail_ttl).await {
            warn!(key = %key, error = %e, "File detail cache write failed");
        }
    }

    pub async fn get_list(&self, tenant_id: Uuid) -> Option<Vec<FileRecord>> {
        let key = keys::files_list(tenant_id);
        match self.cache.get_json::<Vec<FileRecord>>(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "File list cache read failed");
                None
            }
        }
    }

    pub async fn put_list(&self, tenant_id: Uuid, records: &[FileRecord]) {
        let key = keys::files_list(tenant_id);
        if let Err(e) = self.cache.set_json(&key, &records, self.list_ttl).await {
            warn!(key = %key, error = %e, "File list cache write failed");
        }
    }

    /// Drop the tenant's list entry and this file's detail entry.
    pub async fn invalidate(&self, tenant_id: Uuid, file_id: &FileId) {
        for key in [
            keys::files_list(tenant_id),
            keys::file_detail(tenant_id, file_id.as_str()),
        ] {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(key = %key, error = %e, "Cache invalidation failed");
            }
        }
    }
}

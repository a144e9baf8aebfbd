//! In-process metadata store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_entity::file::{FileId, FileRecord};
use filerepo_entity::quota::AggregateStats;
use filerepo_entity::tenant::Tenant;

use crate::store::MetadataStore;

/// Metadata store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    files: RwLock<HashMap<FileId, FileRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant, replacing any tenant with the same ID.
    pub async fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn find_tenant_by_code(&self, code: &str) -> AppResult<Option<Tenant>> {
        let tenants = self.tenants.read().await;
        Ok(tenants.values().find(|t| t.code == code).cloned())
    }

    async fn create_file(&self, record: &FileRecord) -> AppResult<FileRecord> {
        let mut files = self.files.write().await;
        if files.contains_key(record.file_id()) {
            return Err(AppError::database(format!(
                "File {} already exists",
                record.file_id()
            )));
        }
        files.insert(record.file_id().clone(), record.clone());
        Ok(record.clone())
    }

    async fn find_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<Option<FileRecord>> {
        let files = self.files.read().await;
        Ok(files
            .get(file_id)
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned())
    }

    async fn list_files(&self, tenant_id: Uuid) -> AppResult<Vec<FileRecord>> {
        let files = self.files.read().await;
        let mut list: Vec<FileRecord> = files
            .values()
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.file_id().cmp(a.file_id()))
        });
        Ok(list)
    }

    async fn update_file(&self, record: &FileRecord) -> AppResult<FileRecord> {
        let mut files = self.files.write().await;
        match files.get_mut(record.file_id()) {
            Some(existing) if existing.tenant_id() == record.tenant_id() => {
                existing.set_tag(record.tag().map(str::to_string));
                existing.set_metadata(record.metadata().cloned());
                Ok(existing.clone())
            }
            _ => Err(AppError::not_found(format!(
                "File {} not found",
                record.file_id()
            ))),
        }
    }

    async fn delete_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<bool> {
        let mut files = self.files.write().await;
        let owned = files.get(file_id).is_some_and(|r| r.tenant_id() == tenant_id);
        if owned {
            files.remove(file_id);
        }
        Ok(owned)
    }

    async fn aggregate_stats(&self, tenant_id: Uuid) -> AppResult<AggregateStats> {
        let files = self.files.read().await;
        Ok(files
            .values()
            .filter(|r| r.tenant_id() == tenant_id)
            .fold(AggregateStats::default(), |acc, r| AggregateStats {
                file_count: acc.file_count + 1,
                total_bytes: acc.total_bytes + r.size_bytes(),
            }))
    }
}

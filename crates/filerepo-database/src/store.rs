//! The metadata store abstraction consumed by the service layer.

use async_trait::async_trait;
use uuid::Uuid;

use filerepo_core::result::AppResult;
use filerepo_entity::file::{FileId, FileRecord};
use filerepo_entity::quota::AggregateStats;
use filerepo_entity::tenant::Tenant;

use crate::connection::DatabasePool;
use crate::repositories::{FileRepository, TenantRepository};

/// Persistent home of tenants and file records.
///
/// Every file operation is scoped by tenant: a record is only visible
/// through the tenant that owns it.
#[async_trait]
pub trait MetadataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a tenant by code.
    async fn find_tenant_by_code(&self, code: &str) -> AppResult<Option<Tenant>>;

    /// Insert a committed file record.
    async fn create_file(&self, record: &FileRecord) -> AppResult<FileRecord>;

    /// Fetch one file record of a tenant.
    async fn find_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<Option<FileRecord>>;

    /// All file records of a tenant, newest first.
    async fn list_files(&self, tenant_id: Uuid) -> AppResult<Vec<FileRecord>>;

    /// Persist tag, metadata and `modified_at` of an existing record.
    async fn update_file(&self, record: &FileRecord) -> AppResult<FileRecord>;

    /// Remove a file record. Returns whether it existed.
    async fn delete_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<bool>;

    /// Current file count and byte total of a tenant.
    async fn aggregate_stats(&self, tenant_id: Uuid) -> AppResult<AggregateStats>;
}

/// PostgreSQL-backed metadata store.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    tenants: TenantRepository,
    files: FileRepository,
}

impl PgMetadataStore {
    /// Build the store over an open pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            tenants: TenantRepository::new(pool.clone()),
            files: FileRepository::new(pool),
        }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn find_tenant_by_code(&self, code: &str) -> AppResult<Option<Tenant>> {
        self.tenants.find_by_code(code).await
    }

    async fn create_file(&self, record: &FileRecord) -> AppResult<FileRecord> {
        self.files.create(record).await
    }

    async fn find_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<Option<FileRecord>> {
        self.files.find_by_id(tenant_id, file_id).await
    }

    async fn list_files(&self, tenant_id: Uuid) -> AppResult<Vec<FileRecord>> {
        self.files.find_by_tenant(tenant_id).await
    }

    async fn update_file(&self, record: &FileRecord) -> AppResult<FileRecord> {
        self.files.update_attributes(record).await
    }

    async fn delete_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<bool> {
        self.files.delete(tenant_id, file_id).await
    }

    async fn aggregate_stats(&self, tenant_id: Uuid) -> AppResult<AggregateStats> {
        self.files.aggregate_stats(tenant_id).await
    }
}

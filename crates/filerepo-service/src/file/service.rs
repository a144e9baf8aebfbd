//! File service: detail, listing, attribute updates and deletion.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_database::MetadataStore;
use filerepo_entity::file::{FileAttributes, FileId, FileRecord};
use filerepo_storage::LocalStorage;

use super::cache::FileCache;
use crate::context::TenantContext;

/// Operations on committed files of a tenant.
#[derive(Debug, Clone)]
pub struct FileService {
    store: Arc<dyn MetadataStore>,
    storage: Arc<LocalStorage>,
    cache: FileCache,
}

impl FileService {
    pub fn new(store: Arc<dyn MetadataStore>, storage: Arc<LocalStorage>, cache: FileCache) -> Self {
        Self {
            store,
            storage,
            cache,
        }
    }

    /// Fetch one file record, cache first.
    pub async fn get_file(&self, ctx: &TenantContext, file_id: &FileId) -> AppResult<FileRecord> {
        if let Some(hit) = self.cache.get_detail(ctx.tenant_id, file_id).await {
            return Ok(hit);
        }

        let record = self
            .store
            .find_file(ctx.tenant_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        self.cache.put_detail(&record).await;
        Ok(record)
    }

    /// All files of the tenant, newest first, cache first.
    pub async fn list_files(&self, ctx: &TenantContext) -> AppResult<Vec<FileRecord>> {
        if let Some(hit) = self.cache.get_list(ctx.tenant_id).await {
            return Ok(hit);
        }

        let records = self.store.list_files(ctx.tenant_id).await?;
        self.cache.put_list(ctx.tenant_id, &records).await;
        Ok(records)
    }

    /// Change tag and/or metadata. Fields left as `None` are kept.
    pub async fn update_file(
        &self,
        ctx: &TenantContext,
        file_id: &FileId,
        changes: FileAttributes,
    ) -> AppResult<FileRecord> {
        changes.check().map_err(AppError::validation)?;

        let mut record = self
            .store
            .find_file(ctx.tenant_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if let Some(tag) = changes.tag {
            record.set_tag(Some(tag));
        }
        if let Some(metadata) = changes.metadata {
            record.set_metadata(Some(metadata));
        }

        let updated = self.store.update_file(&record).await?;
        self.cache.invalidate(ctx.tenant_id, file_id).await;

        info!(tenant_id = %ctx.tenant_id, file_id = %file_id, "File attributes updated");
        Ok(updated)
    }

    /// Remove the record, then the stored bytes, then cached entries.
    pub async fn delete_file(&self, ctx: &TenantContext, file_id: &FileId) -> AppResult<()> {
        let record = self
            .store
            .find_file(ctx.tenant_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if !self.store.delete_file(ctx.tenant_id, file_id).await? {
            return Err(AppError::not_found("File not found"));
        }

        self.storage
            .delete_best_effort(Path::new(record.storage_path()))
            .await;
        self.cache.invalidate(ctx.tenant_id, file_id).await;

        info!(tenant_id = %ctx.tenant_id, file_id = %file_id, "File deleted");
        Ok(())
    }
}

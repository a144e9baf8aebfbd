//! File repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::result::AppResult;
use filerepo_entity::file::{FileId, FileRecord};
use filerepo_entity::quota::AggregateStats;

/// Repository for file record CRUD and aggregate queries.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    pub async fn create(&self, record: &FileRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (file_id, tenant_id, file_name, storage_path, media_type, \
             size_bytes, tag, metadata, created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(record.file_id())
        .bind(record.tenant_id())
        .bind(record.file_name())
        .bind(record.storage_path())
        .bind(record.media_type())
        .bind(record.size_bytes() as i64)
        .bind(record.tag())
        .bind(record.metadata())
        .bind(record.created_at())
        .bind(record.modified_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    /// Find a file by tenant and ID.
    pub async fn find_by_id(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE tenant_id = $1 AND file_id = $2")
            .bind(tenant_id)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// List all files of a tenant, newest first.
    pub async fn find_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE tenant_id = $1 ORDER BY created_at DESC, file_id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// Persist the mutable attributes of a file record.
    pub async fn update_attributes(&self, record: &FileRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET tag = $3, metadata = $4, modified_at = $5 \
             WHERE tenant_id = $1 AND file_id = $2 RETURNING *",
        )
        .bind(record.tenant_id())
        .bind(record.file_id())
        .bind(record.tag())
        .bind(record.metadata())
        .bind(record.modified_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {} not found", record.file_id())))
    }

    /// Delete a file record. Returns whether a row was removed.
    pub async fn delete(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE tenant_id = $1 AND file_id = $2")
            .bind(tenant_id)
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// File count and byte total for a tenant.
    pub async fn aggregate_stats(&self, tenant_id: Uuid) -> AppResult<AggregateStats> {
        let (count, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*)::BIGINT, COALESCE(SUM(size_bytes), 0)::BIGINT \
             FROM files WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to aggregate file stats", e)
        })?;

        Ok(AggregateStats {
            file_count: count.max(0) as u64,
            total_bytes: total.max(0) as u64,
        })
    }
}

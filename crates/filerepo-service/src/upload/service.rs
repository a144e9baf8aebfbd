//! Ingest service: lock, admit, stream, validate, reconcile, persist.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use filerepo_cache::CacheManager;
use filerepo_core::config::{CacheConfig, UploadConfig};
use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::result::AppResult;
use filerepo_core::types::ByteStream;
use filerepo_database::MetadataStore;
use filerepo_entity::file::{FileAttributes, FileId, FileRecord, NewFileRecord};
use filerepo_entity::quota::QuotaSnapshot;
use filerepo_storage::paths::relative_storage_path;
use filerepo_storage::{LocalStorage, PartialFile};

use super::request::IngestRequest;
use crate::context::TenantContext;
use crate::file::FileCache;
use crate::lock::UploadLockManager;
use crate::quota::QuotaLedger;
use crate::validation::content;
use crate::validation::filename::{effective_media_type, extension_of, sanitize_filename};
use crate::validation::{Candidate, ValidationEngine};

/// Facts about the upload fixed before any byte is written.
struct Plan {
    file_id: FileId,
    file_name: String,
    extension: String,
    declared_media_type: String,
    snapshot: QuotaSnapshot,
}

/// Orchestrates the ingestion of one upload.
///
/// Every exit path after the destination file is created either commits it
/// together with its record or removes it, and every exit path after the
/// lock is taken releases the lock. Cancellation is covered by the
/// [`PartialFile`] and [`crate::lock::UploadLock`] drop guards.
#[derive(Debug, Clone)]
pub struct IngestService {
    store: Arc<dyn MetadataStore>,
    storage: Arc<LocalStorage>,
    locks: UploadLockManager,
    quota: QuotaLedger,
    validator: ValidationEngine,
    cache: FileCache,
    config: UploadConfig,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        storage: Arc<LocalStorage>,
        cache: Arc<CacheManager>,
        cache_config: &CacheConfig,
        config: UploadConfig,
    ) -> Self {
        Self {
            quota: QuotaLedger::new(Arc::clone(&store)),
            locks: UploadLockManager::new(Arc::clone(&cache), config.lock_ttl()),
            validator: ValidationEngine::new(config.archive_fail_closed),
            cache: FileCache::new(cache, cache_config),
            store,
            storage,
            config,
        }
    }

    /// Ingest one upload for a tenant and return the committed record.
    ///
    /// Fails with `Conflict` while another upload of the same declared name
    /// is in flight, `Validation` when the content breaks a tenant rule,
    /// `QuotaExceeded` when the tenant is out of room, and `Storage` on I/O
    /// failures (including a stalled stream).
    pub async fn ingest(&self, ctx: &TenantContext, request: IngestRequest) -> AppResult<FileRecord> {
        request
            .attributes
            .check()
            .map_err(AppError::validation)?;

        let lock = self
            .locks
            .try_acquire(ctx.tenant_id, &request.file_name)
            .await?;

        let result = self.ingest_locked(ctx, request).await;
        lock.release().await;

        if let Err(e) = &result {
            debug!(tenant_id = %ctx.tenant_id, error = %e, "Upload rejected");
        }
        result
    }

    async fn ingest_locked(&self, ctx: &TenantContext, request: IngestRequest) -> AppResult<FileRecord> {
        let IngestRequest {
            file_name,
            content_type,
            attributes,
            stream,
        } = request;

        let snapshot = self.quota.admit(ctx).await?;

        let file_id = FileId::generate();
        let safe_name = sanitize_filename(&file_name, self.config.max_filename_length);
        let extension = extension_of(&safe_name);
        let declared_media_type = effective_media_type(content_type.as_deref(), &extension);

        let relative = relative_storage_path(
            &ctx.tenant_code,
            file_id.as_str(),
            &extension,
            Utc::now(),
        )?;
        let (full_path, file) = self.storage.create_exclusive(&relative).await?;
        let partial = PartialFile::new(full_path);

        let plan = Plan {
            file_id,
            file_name: safe_name,
            extension,
            declared_media_type,
            snapshot,
        };

        let outcome = self
            .write_and_record(ctx, &plan, partial.path(), file, stream, attributes)
            .await;

        match outcome {
            Ok(record) => {
                partial.commit();
                self.cache.invalidate(ctx.tenant_id, record.file_id()).await;
                info!(
                    tenant_id = %ctx.tenant_id,
                    file_id = %record.file_id(),
                    file_name = record.file_name(),
                    media_type = record.media_type(),
                    size = record.size_bytes(),
                    "Upload completed"
                );
                Ok(record)
            }
            Err(e) => {
                partial.discard().await;
                Err(e)
            }
        }
    }

    /// Everything between creating the destination and committing it.
    async fn write_and_record(
        &self,
        ctx: &TenantContext,
        plan: &Plan,
        path: &Path,
        file: File,
        stream: ByteStream,
        attributes: FileAttributes,
    ) -> AppResult<FileRecord> {
        let size = self.stream_to_disk(ctx, plan, file, stream).await?;

        let candidate = Candidate {
            extension: &plan.extension,
            media_type: &plan.declared_media_type,
            size_bytes: size,
        };
        self.validator
            .validate(&ctx.config, &candidate, Some(path))
            .await?;

        let media_type = self.reconcile_media_type(ctx, plan, path, size).await?;

        let record = FileRecord::new(NewFileRecord {
            file_id: plan.file_id.clone(),
            tenant_id: ctx.tenant_id,
            file_name: plan.file_name.clone(),
            storage_path: path.to_string_lossy().into_owned(),
            media_type,
            size_bytes: size,
            tag: attributes.tag,
            metadata: attributes.metadata,
        });

        self.store.create_file(&record).await
    }

    /// Copy the stream to disk in bounded chunks, checking limits and quota
    /// against the running total before each write.
    async fn stream_to_disk(
        &self,
        ctx: &TenantContext,
        plan: &Plan,
        mut file: File,
        mut stream: ByteStream,
    ) -> AppResult<u64> {
        let chunk_size = self.config.chunk_size_bytes.max(1);
        let read_timeout = self.config.chunk_read_timeout();
        let mut written: u64 = 0;

        loop {
            let next = tokio::time::timeout(read_timeout, stream.next())
                .await
                .map_err(|_| AppError::storage("upload stream timed out"))?;
            let Some(chunk) = next else {
                break;
            };
            let mut chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read upload stream", e)
            })?;

            while !chunk.is_empty() {
                let piece = chunk.split_to(chunk_size.min(chunk.len()));
                let total = written + piece.len() as u64;

                ValidationEngine::check_limits(
                    &ctx.config,
                    &Candidate {
                        extension: &plan.extension,
                        media_type: &plan.declared_media_type,
                        size_bytes: total,
                    },
                )?;
                QuotaLedger::check_streamed(&plan.snapshot, total)?;

                file.write_all(&piece).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e)
                })?;
                written = total;
            }
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush file", e))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync file", e))?;

        debug!(file_id = %plan.file_id, bytes = written, "Upload stream written");
        Ok(written)
    }

    /// Sniff the stored bytes and settle on the media type to record.
    async fn reconcile_media_type(
        &self,
        ctx: &TenantContext,
        plan: &Plan,
        path: &Path,
        size: u64,
    ) -> AppResult<String> {
        let head = self.storage.read_head(path, self.config.sniff_bytes).await?;
        let sniffed = tokio::task::spawn_blocking(move || content::sniff(&head))
            .await
            .map_err(|e| AppError::internal(format!("Content sniffing task failed: {e}")))?;

        let media_type = content::reconcile(&plan.extension, &plan.declared_media_type, sniffed)
            .map_err(AppError::validation)?;

        if media_type != plan.declared_media_type {
            debug!(
                file_id = %plan.file_id,
                declared = %plan.declared_media_type,
                sniffed = %media_type,
                "Media type corrected from content"
            );
            ValidationEngine::check_limits(
                &ctx.config,
                &Candidate {
                    extension: &plan.extension,
                    media_type: &media_type,
                    size_bytes: size,
                },
            )?;
        }

        Ok(media_type)
    }
}

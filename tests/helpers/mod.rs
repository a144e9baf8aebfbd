//! Shared test helpers for integration tests.
//!
//! Wires the real services over the in-memory metadata store, the moka
//! cache and a temporary storage root.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;
use zip::write::{SimpleFileOptions, ZipWriter};

use filerepo_cache::CacheManager;
use filerepo_core::config::{CacheConfig, UploadConfig};
use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_core::types::{ByteStream, byte_stream_from};
use filerepo_database::{MemoryMetadataStore, MetadataStore};
use filerepo_entity::file::{FileId, FileRecord};
use filerepo_entity::quota::AggregateStats;
use filerepo_entity::tenant::{Tenant, TenantConfig};
use filerepo_service::{
    FileCache, FileService, IngestRequest, IngestService, QuotaLedger, TenantContext,
    TenantService,
};
use filerepo_storage::LocalStorage;

/// Test application context
pub struct TestApp {
    pub store: Arc<MemoryMetadataStore>,
    pub cache: Arc<CacheManager>,
    pub storage: Arc<LocalStorage>,
    pub ingest: IngestService,
    pub files: FileService,
    pub tenants: TenantService,
    pub quota: QuotaLedger,
    root: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application with default upload settings
    pub async fn new() -> Self {
        Self::with_upload_config(test_upload_config()).await
    }

    /// Create a new test application with custom upload settings
    pub async fn with_upload_config(upload: UploadConfig) -> Self {
        let store = Arc::new(MemoryMetadataStore::new());
        Self::build(Arc::clone(&store), store, upload).await
    }

    /// Create a test application whose ingest path writes through `store`
    pub async fn with_store(store: Arc<dyn MetadataStore>) -> Self {
        let memory = Arc::new(MemoryMetadataStore::new());
        Self::build(memory, store, test_upload_config()).await
    }

    async fn build(
        memory: Arc<MemoryMetadataStore>,
        store: Arc<dyn MetadataStore>,
        upload: UploadConfig,
    ) -> Self {
        let cache_config = CacheConfig::default();
        let cache = Arc::new(
            CacheManager::new(&cache_config)
                .await
                .expect("Failed to init cache"),
        );
        let root = tempfile::tempdir().expect("Failed to create storage root");
        let storage = Arc::new(
            LocalStorage::new(root.path())
                .await
                .expect("Failed to init storage"),
        );

        let ingest = IngestService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&cache),
            &cache_config,
            upload,
        );
        let files = FileService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            FileCache::new(Arc::clone(&cache), &cache_config),
        );
        let tenants = TenantService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Duration::from_secs(60),
        );
        let quota = QuotaLedger::new(store);

        Self {
            store: memory,
            cache,
            storage,
            ingest,
            files,
            tenants,
            quota,
            root,
        }
    }

    /// Register a tenant and return its context
    pub async fn create_tenant(&self, code: &str, config: TenantConfig) -> TenantContext {
        let tenant = Tenant::new(code, config);
        self.store.insert_tenant(tenant.clone()).await;
        TenantContext::from(tenant)
    }

    /// Ingest an in-memory payload under `file_name`
    pub async fn upload(
        &self,
        ctx: &TenantContext,
        file_name: &str,
        content: &[u8],
    ) -> AppResult<FileRecord> {
        let request = IngestRequest::new(file_name, single_chunk(content));
        self.ingest.ingest(ctx, request).await
    }

    /// Every regular file under the storage root
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        collect_files(self.root.path(), &mut found);
        found
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}

pub fn test_upload_config() -> UploadConfig {
    UploadConfig {
        chunk_size_bytes: 4096,
        chunk_read_timeout_seconds: 1,
        lock_ttl_seconds: 30,
        ..UploadConfig::default()
    }
}

/// A tenant that accepts plain text, PDFs, PNGs and zips with no limits.
pub fn permissive_config() -> TenantConfig {
    TenantConfig::from_json(serde_json::json!({
        "allowed_extensions": [".txt", ".pdf", ".png", ".zip", ".bin"],
        "allowed_mime_types": [
            "text/plain",
            "application/pdf",
            "image/png",
            "application/zip",
            "application/octet-stream"
        ],
        "max_zip_depth": 0
    }))
    .expect("valid tenant config")
}

pub fn single_chunk(content: &[u8]) -> ByteStream {
    byte_stream_from(vec![Bytes::copy_from_slice(content)])
}

/// A stream fed chunk by chunk from the returned sender.
pub fn channel_stream() -> (mpsc::Sender<std::io::Result<Bytes>>, ByteStream) {
    let (tx, mut rx) = mpsc::channel(8);
    let stream = futures::stream::poll_fn(move |cx| rx.poll_recv(cx));
    (tx, Box::pin(stream))
}

/// Build a zip whose innermost archive sits `depth` levels down.
pub fn nested_zip(depth: u32) -> Vec<u8> {
    let mut current = plain_zip("leaf.txt", b"hello");
    for level in 0..depth {
        current = plain_zip(&format!("level{level}.zip"), &current);
    }
    current
}

pub fn plain_zip(name: &str, contents: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(name, SimpleFileOptions::default()).unwrap();
    writer.write_all(contents).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Flip the stored CRC of a zip's first entry in both its local header and
/// the central directory, leaving the compressed data intact.
pub fn corrupt_first_crc(bytes: &mut [u8]) {
    assert_eq!(&bytes[..4], b"PK\x03\x04");
    bytes[14] ^= 0xFF;
    let eocd = bytes
        .windows(4)
        .rposition(|w| w == b"PK\x05\x06")
        .expect("end of central directory");
    let cd = u32::from_le_bytes(bytes[eocd + 16..eocd + 20].try_into().unwrap()) as usize;
    assert_eq!(&bytes[cd..cd + 4], b"PK\x01\x02");
    bytes[cd + 16] ^= 0xFF;
}

pub const PNG_HEADER: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

/// Metadata store whose file inserts always fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryMetadataStore,
}

impl FailingStore {
    pub async fn with_tenant(tenant: Tenant) -> Self {
        let store = Self::default();
        store.inner.insert_tenant(tenant).await;
        store
    }
}

#[async_trait]
impl MetadataStore for FailingStore {
    async fn find_tenant_by_code(&self, code: &str) -> AppResult<Option<Tenant>> {
        self.inner.find_tenant_by_code(code).await
    }

    async fn create_file(&self, _record: &FileRecord) -> AppResult<FileRecord> {
        Err(AppError::database("connection reset"))
    }

    async fn find_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<Option<FileRecord>> {
        self.inner.find_file(tenant_id, file_id).await
    }

    async fn list_files(&self, tenant_id: Uuid) -> AppResult<Vec<FileRecord>> {
        self.inner.list_files(tenant_id).await
    }

    async fn update_file(&self, record: &FileRecord) -> AppResult<FileRecord> {
        self.inner.update_file(record).await
    }

    async fn delete_file(&self, tenant_id: Uuid, file_id: &FileId) -> AppResult<bool> {
        self.inner.delete_file(tenant_id, file_id).await
    }

    async fn aggregate_stats(&self, tenant_id: Uuid) -> AppResult<AggregateStats> {
        self.inner.aggregate_stats(tenant_id).await
    }
}

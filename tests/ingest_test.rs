//! Integration tests for the ingestion pipeline.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use filerepo_core::error::{ErrorKind, QuotaKind};
use filerepo_entity::tenant::{Tenant, TenantConfig};
use filerepo_service::{IngestRequest, TenantContext};

use helpers::{TestApp, permissive_config};

fn txt_only_config() -> TenantConfig {
    TenantConfig::from_json(serde_json::json!({
        "max_upload_size_kb": 10,
        "allowed_extensions": [".txt"],
        "allowed_mime_types": ["text/plain"],
        "max_zip_depth": 0
    }))
    .unwrap()
}

#[tokio::test]
async fn test_small_text_upload_succeeds() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", txt_only_config()).await;

    let record = app.upload(&ctx, "hello.txt", b"hello").await.unwrap();

    assert_eq!(record.size_bytes(), 5);
    assert_eq!(record.media_type(), "text/plain");
    assert_eq!(record.file_name(), "hello.txt");
    assert!(record.file_id().as_str().starts_with("CF_FR_"));
    assert_eq!(std::fs::read(record.storage_path()).unwrap(), b"hello");
}

#[tokio::test]
async fn test_oversize_upload_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", txt_only_config()).await;

    let err = app
        .upload(&ctx, "big.txt", &vec![b'a'; 11_000])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "File exceeds maximum allowed size");
    assert!(app.stored_files().is_empty());
    assert_eq!(app.quota.snapshot(&ctx).await.unwrap().file_count, 0);
}

#[tokio::test]
async fn test_size_limit_is_inclusive() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", txt_only_config()).await;

    assert!(app.upload(&ctx, "edge.txt", &vec![b'a'; 10 * 1024]).await.is_ok());
    assert!(
        app.upload(&ctx, "over.txt", &vec![b'a'; 10 * 1024 + 1])
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_multi_chunk_size_matches_input() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let chunks: Vec<Bytes> = (0..5u8).map(|i| Bytes::from(vec![b'a' + i; 10_000])).collect();
    let request = IngestRequest::new(
        "chunks.txt",
        filerepo_core::types::byte_stream_from(chunks),
    );
    let record = app.ingest.ingest(&ctx, request).await.unwrap();

    assert_eq!(record.size_bytes(), 50_000);
    assert_eq!(std::fs::metadata(record.storage_path()).unwrap().len(), 50_000);
}

#[tokio::test]
async fn test_zip_rejected_when_not_allowed() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", txt_only_config()).await;

    let err = app
        .upload(&ctx, "bundle.zip", &helpers::nested_zip(0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "File extension not allowed");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_empty_allow_list_rejects_everything() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", TenantConfig::default()).await;

    for name in ["a.txt", "b.pdf", "c.unknownext", "noext"] {
        let err = app.upload(&ctx, name, b"payload").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{name}");
    }
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_forbidden_extension_wins_over_allowed() {
    let app = TestApp::new().await;
    let config = TenantConfig::from_json(serde_json::json!({
        "allowed_extensions": [".txt"],
        "forbidden_extensions": ["TXT"],
        "allowed_mime_types": ["text/plain"]
    }))
    .unwrap();
    let ctx = app.create_tenant("acme", config).await;

    let err = app.upload(&ctx, "a.txt", b"abc").await.unwrap_err();
    assert_eq!(err.message, "File extension is forbidden");
}

#[tokio::test]
async fn test_empty_upload_rejected() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let err = app.upload(&ctx, "empty.txt", b"").await.unwrap_err();
    assert_eq!(err.message, "Empty files are not allowed");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_zip_depth_boundary() {
    for max in 0..3u32 {
        let app = TestApp::new().await;
        let mut config = permissive_config();
        config.max_zip_depth = max;
        let ctx = app.create_tenant("acme", config).await;

        for depth in 0..4u32 {
            let result = app
                .upload(&ctx, &format!("d{depth}.zip"), &helpers::nested_zip(depth))
                .await;
            assert_eq!(result.is_ok(), depth <= max, "depth={depth} max={max}");
            if let Err(e) = result {
                assert_eq!(e.message, "nested archive depth exceeded");
            }
        }
    }
}

#[tokio::test]
async fn test_corrupt_zip_is_invalid_archive() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let err = app
        .upload(&ctx, "broken.zip", &vec![b'x'; 512])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "invalid archive");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_corrupt_nested_entry_cannot_bypass_depth() {
    let app = TestApp::new().await;
    let mut config = permissive_config();
    config.max_zip_depth = 1;
    let ctx = app.create_tenant("acme", config).await;

    let mut bundle = helpers::plain_zip("inner.zip", &helpers::nested_zip(1));
    let err = app.upload(&ctx, "honest.zip", &bundle).await.unwrap_err();
    assert_eq!(err.message, "nested archive depth exceeded");

    helpers::corrupt_first_crc(&mut bundle);
    let err = app.upload(&ctx, "tampered.zip", &bundle).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "invalid archive");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_oversized_nested_entry_is_invalid_archive() {
    let app = TestApp::new().await;
    let mut config = permissive_config();
    config.max_upload_size_kb = Some(8);
    config.max_zip_depth = 3;
    let ctx = app.create_tenant("acme", config).await;

    let bundle = helpers::plain_zip("big.zip", &vec![0u8; 512 * 1024]);
    assert!(bundle.len() < 8 * 1024);

    let err = app.upload(&ctx, "bundle.zip", &bundle).await.unwrap_err();
    assert_eq!(err.message, "invalid archive");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_png_named_pdf_is_rejected() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let err = app
        .upload(&ctx, "report.pdf", helpers::PNG_HEADER)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "file content does not match extension");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_png_in_generic_binary_is_reclassified() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let record = app
        .upload(&ctx, "blob.bin", helpers::PNG_HEADER)
        .await
        .unwrap();
    assert_eq!(record.media_type(), "image/png");
}

#[tokio::test]
async fn test_identical_content_is_not_deduplicated() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let first = app.upload(&ctx, "same.txt", b"same bytes").await.unwrap();
    let second = app.upload(&ctx, "same.txt", b"same bytes").await.unwrap();
    let third = app.upload(&ctx, "other.txt", b"same bytes").await.unwrap();

    assert_ne!(first.file_id(), second.file_id());
    assert_ne!(second.file_id(), third.file_id());
    assert_ne!(first.storage_path(), second.storage_path());
    assert_eq!(app.stored_files().len(), 3);
}

#[tokio::test]
async fn test_concurrent_same_name_conflicts() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let (tx, stream) = helpers::channel_stream();
    let ingest = app.ingest.clone();
    let winner_ctx = ctx.clone();
    let winner = tokio::spawn(async move {
        ingest
            .ingest(&winner_ctx, IngestRequest::new("shared.txt", stream))
            .await
    });

    tx.send(Ok(Bytes::from_static(b"first half "))).await.unwrap();
    for _ in 0..200 {
        if !app.stored_files().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(app.stored_files().len(), 1, "winner never started writing");

    let err = app.upload(&ctx, "shared.txt", b"loser").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.is_retryable());

    // A different name is not blocked.
    assert!(app.upload(&ctx, "other.txt", b"unrelated").await.is_ok());

    tx.send(Ok(Bytes::from_static(b"second half"))).await.unwrap();
    drop(tx);
    let record = winner.await.unwrap().unwrap();
    assert_eq!(record.size_bytes(), 22);

    assert!(app.upload(&ctx, "shared.txt", b"retry").await.is_ok());
}

#[tokio::test]
async fn test_same_name_in_other_tenant_is_independent() {
    let app = TestApp::new().await;
    let acme = app.create_tenant("acme", permissive_config()).await;
    let globex = app.create_tenant("globex", permissive_config()).await;

    let (tx, stream) = helpers::channel_stream();
    let ingest = app.ingest.clone();
    let acme_ctx = acme.clone();
    let pending = tokio::spawn(async move {
        ingest
            .ingest(&acme_ctx, IngestRequest::new("shared.txt", stream))
            .await
    });
    tx.send(Ok(Bytes::from_static(b"x"))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(app.upload(&globex, "shared.txt", b"y").await.is_ok());

    drop(tx);
    assert!(pending.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_stalled_stream_times_out_and_cleans_up() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let (tx, stream) = helpers::channel_stream();
    tx.send(Ok(Bytes::from_static(b"partial"))).await.unwrap();

    let err = app
        .ingest
        .ingest(&ctx, IngestRequest::new("slow.txt", stream))
        .await
        .unwrap_err();
    drop(tx);

    assert_eq!(err.kind, ErrorKind::Storage);
    assert_eq!(err.message, "upload stream timed out");
    assert!(app.stored_files().is_empty());

    // The lock was released on the error path.
    assert!(app.upload(&ctx, "slow.txt", b"quick").await.is_ok());
}

#[tokio::test]
async fn test_stream_error_is_storage_error() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let (tx, stream) = helpers::channel_stream();
    tx.send(Ok(Bytes::from_static(b"abc"))).await.unwrap();
    tx.send(Err(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "client went away",
    )))
    .await
    .unwrap();
    drop(tx);

    let err = app
        .ingest
        .ingest(&ctx, IngestRequest::new("drop.txt", stream))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_store_failure_removes_written_bytes() {
    let tenant = Tenant::new("acme", permissive_config());
    let store = Arc::new(helpers::FailingStore::with_tenant(tenant.clone()).await);
    let app = TestApp::with_store(store).await;
    let ctx = TenantContext::from(tenant);

    let err = app.upload(&ctx, "doc.txt", b"content").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_dropped_upload_releases_lock_and_file() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let (tx, stream) = helpers::channel_stream();
    let ingest = app.ingest.clone();
    let task_ctx = ctx.clone();
    let handle = tokio::spawn(async move {
        ingest
            .ingest(&task_ctx, IngestRequest::new("cancel.txt", stream))
            .await
    });
    tx.send(Ok(Bytes::from_static(b"some"))).await.unwrap();
    for _ in 0..200 {
        if !app.stored_files().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
    // Give the spawned lock release a chance to run.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(app.stored_files().is_empty());
    assert!(app.upload(&ctx, "cancel.txt", b"again").await.is_ok());
}

#[tokio::test]
async fn test_file_count_quota() {
    let app = TestApp::new().await;
    let mut config = permissive_config();
    config.file_count_limit = Some(2);
    let ctx = app.create_tenant("acme", config).await;

    app.upload(&ctx, "1.txt", b"a").await.unwrap();
    app.upload(&ctx, "2.txt", b"b").await.unwrap();
    let err = app.upload(&ctx, "3.txt", b"c").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::QuotaExceeded(QuotaKind::FileCount));
    assert!(!err.is_retryable());
    assert_eq!(app.stored_files().len(), 2);
}

#[tokio::test]
async fn test_storage_quota_checked_while_streaming() {
    let app = TestApp::new().await;
    let mut config = permissive_config();
    config.storage_quota_bytes = Some(10_000);
    let ctx = app.create_tenant("acme", config).await;

    app.upload(&ctx, "fits.txt", &vec![b'a'; 6_000]).await.unwrap();
    let err = app
        .upload(&ctx, "overflow.txt", &vec![b'b'; 6_000])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::QuotaExceeded(QuotaKind::Storage));
    assert_eq!(app.stored_files().len(), 1);

    // Exactly filling the quota is allowed; after that admission refuses.
    app.upload(&ctx, "rest.txt", &vec![b'c'; 4_000]).await.unwrap();
    let err = app.upload(&ctx, "more.txt", b"d").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded(QuotaKind::Storage));
}

#[tokio::test]
async fn test_invalid_tag_rejected_before_writing() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let request = IngestRequest::new("a.txt", helpers::single_chunk(b"abc")).with_tag("_bad tag");
    let err = app.ingest.ingest(&ctx, request).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_tag_and_metadata_are_recorded() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let request = IngestRequest::new("notes.txt", helpers::single_chunk(b"abc"))
        .with_tag("Q3_report")
        .with_metadata(serde_json::json!({ "source": "scanner" }));
    let record = app.ingest.ingest(&ctx, request).await.unwrap();

    assert_eq!(record.tag(), Some("Q3_report"));
    assert_eq!(record.metadata().unwrap()["source"], "scanner");
    assert_eq!(record.created_at(), record.modified_at());
}

#[tokio::test]
async fn test_unsafe_name_is_sanitized() {
    let app = TestApp::new().await;
    let ctx = app.create_tenant("acme", permissive_config()).await;

    let record = app
        .upload(&ctx, "../../etc/passwd.txt", b"root")
        .await
        .unwrap();

    assert!(!record.file_name().contains('/'));
    assert!(!record.file_name().contains(".."));
    assert!(std::path::Path::new(record.storage_path()).starts_with(app.storage.root()));
}

//! Ingest a local file through the full upload pipeline.

use std::path::{Path, PathBuf};

use clap::Args;
use tokio_util::io::ReaderStream;
use tracing::debug;

use filerepo_core::config::AppConfig;
use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::types::ByteStream;
use filerepo_service::IngestRequest;

use crate::output::{self, OutputFormat};

/// Arguments for the ingest command
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Local file to upload
    pub path: PathBuf,
    /// Tenant code
    #[arg(short, long)]
    pub tenant: String,
    /// Declared file name (defaults to the local file name)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Declared content type
    #[arg(long)]
    pub content_type: Option<String>,
    /// Tag to attach to the record
    #[arg(long)]
    pub tag: Option<String>,
    /// JSON object to attach as metadata
    #[arg(long)]
    pub metadata: Option<String>,
}

/// Execute the ingest command
pub async fn execute(
    args: &IngestArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let file_name = declared_name(&args.path, args.name.as_deref())?;
    let file = tokio::fs::File::open(&args.path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to open '{}': {e}", args.path.display()),
            e,
        )
    })?;
    debug!(path = %args.path.display(), tenant = %args.tenant, "Streaming local file");
    let stream: ByteStream = Box::pin(ReaderStream::with_capacity(
        file,
        config.upload.chunk_size_bytes,
    ));

    let mut request = IngestRequest::new(file_name, stream);
    if let Some(content_type) = &args.content_type {
        request = request.with_content_type(content_type);
    }
    if let Some(tag) = &args.tag {
        request = request.with_tag(tag);
    }
    if let Some(raw) = &args.metadata {
        request = request.with_metadata(serde_json::from_str(raw)?);
    }

    let services = super::Services::connect(config).await?;
    let result = async {
        let ctx = services.tenants.context(&args.tenant).await?;
        services.ingest.ingest(&ctx, request).await
    }
    .await;
    services.close().await;

    let record = result?;
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Ingested '{}' as {}",
            record.file_name(),
            record.file_id()
        ));
    }
    output::print_file(&record, format);
    Ok(())
}

fn declared_name(path: &Path, name: Option<&str>) -> Result<String, AppError> {
    if let Some(name) = name {
        return Ok(name.to_string());
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("'{}' has no file name", path.display())))
}

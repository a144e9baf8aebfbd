//! Stored file management commands.

use clap::{Args, Subcommand};

use filerepo_core::config::AppConfig;
use filerepo_core::error::AppError;
use filerepo_entity::file::{FileAttributes, FileId};

use crate::output::{self, FileRow, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// List a tenant's files, newest first
    List {
        /// Tenant code
        #[arg(short, long)]
        tenant: String,
    },
    /// Show one file record
    Get {
        /// File identifier
        file_id: String,
        /// Tenant code
        #[arg(short, long)]
        tenant: String,
    },
    /// Change a file's tag or metadata
    Update {
        /// File identifier
        file_id: String,
        /// Tenant code
        #[arg(short, long)]
        tenant: String,
        /// New tag
        #[arg(long)]
        tag: Option<String>,
        /// New metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Delete a file record and its content
    Delete {
        /// File identifier
        file_id: String,
        /// Tenant code
        #[arg(short, long)]
        tenant: String,
    },
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    // Parse user input before opening any connection.
    let attributes = match &args.command {
        FileCommand::Update { tag, metadata, .. } => Some(FileAttributes {
            tag: tag.clone(),
            metadata: metadata.as_deref().map(serde_json::from_str).transpose()?,
        }),
        _ => None,
    };

    let services = super::Services::connect(config).await?;
    let result = run(&services, &args.command, attributes, format).await;
    services.close().await;
    result
}

async fn run(
    services: &super::Services,
    command: &FileCommand,
    attributes: Option<FileAttributes>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match command {
        FileCommand::List { tenant } => {
            let ctx = services.tenants.context(tenant).await?;
            let records = services.files.list_files(&ctx).await?;
            let rows: Vec<FileRow> = records.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
        FileCommand::Get { file_id, tenant } => {
            let ctx = services.tenants.context(tenant).await?;
            let record = services
                .files
                .get_file(&ctx, &FileId::parse(file_id.as_str()))
                .await?;
            output::print_file(&record, format);
        }
        FileCommand::Update {
            file_id, tenant, ..
        } => {
            let ctx = services.tenants.context(tenant).await?;
            let record = services
                .files
                .update_file(
                    &ctx,
                    &FileId::parse(file_id.as_str()),
                    attributes.unwrap_or_default(),
                )
                .await?;
            output::print_file(&record, format);
        }
        FileCommand::Delete { file_id, tenant } => {
            let ctx = services.tenants.context(tenant).await?;
            services
                .files
                .delete_file(&ctx, &FileId::parse(file_id.as_str()))
                .await?;
            output::print_success(&format!("File {file_id} deleted"));
        }
    }
    Ok(())
}

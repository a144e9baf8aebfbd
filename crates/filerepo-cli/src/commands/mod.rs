//! CLI command definitions and dispatch.

pub mod config;
pub mod file;
pub mod ingest;
pub mod migrate;
pub mod quota;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use filerepo_cache::CacheManager;
use filerepo_core::config::AppConfig;
use filerepo_core::error::AppError;
use filerepo_database::{DatabasePool, MetadataStore, PgMetadataStore};
use filerepo_service::{FileCache, FileService, IngestService, QuotaLedger, TenantService};
use filerepo_storage::LocalStorage;

use crate::output::OutputFormat;

/// FileRepo multi-tenant file repository
#[derive(Debug, Parser)]
#[command(name = "filerepo", version, about = "FileRepo ingestion and administration CLI")]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml", env = "FILEREPO_CONFIG")]
    pub config: String,

    /// Environment overlay name (loads `config/<env>.toml` when present)
    #[arg(short, long, default_value = "development", env = "FILEREPO_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a local file into a tenant's repository
    Ingest(ingest::IngestArgs),
    /// Show a tenant's usage against its quotas
    Quota(quota::QuotaArgs),
    /// Stored file management
    File(file::FileArgs),
    /// Apply pending database migrations
    Migrate,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load the layered configuration selected by the global flags.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Ingest(args) => ingest::execute(args, &config, self.format).await,
            Commands::Quota(args) => quota::execute(args, &config, self.format).await,
            Commands::File(args) => file::execute(args, &config, self.format).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Fully wired services for commands that touch tenant data.
pub struct Services {
    pub tenants: TenantService,
    pub ingest: IngestService,
    pub files: FileService,
    pub quota: QuotaLedger,
    db: DatabasePool,
}

impl Services {
    /// Connect to the metadata store and cache and open the storage root.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let store: Arc<dyn MetadataStore> = Arc::new(PgMetadataStore::new(db.clone()));
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        let storage = Arc::new(LocalStorage::new(&config.storage.root_path).await?);

        let tenants = TenantService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Duration::from_secs(config.cache.default_ttl_seconds),
        );
        let ingest = IngestService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&cache),
            &config.cache,
            config.upload.clone(),
        );
        let files = FileService::new(
            Arc::clone(&store),
            storage,
            FileCache::new(cache, &config.cache),
        );
        let quota = QuotaLedger::new(store);

        Ok(Self {
            tenants,
            ingest,
            files,
            quota,
            db,
        })
    }

    /// Release pooled connections.
    pub async fn close(self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest_command() {
        let cli = Cli::try_parse_from([
            "filerepo",
            "--format",
            "json",
            "ingest",
            "./report.pdf",
            "--tenant",
            "acme",
            "--tag",
            "q3",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Ingest(args) => {
                assert_eq!(args.tenant, "acme");
                assert_eq!(args.tag.as_deref(), Some("q3"));
                assert!(args.name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_update() {
        let cli = Cli::try_parse_from([
            "filerepo",
            "file",
            "update",
            "CF_FR_abc",
            "--tenant",
            "acme",
            "--metadata",
            "{\"k\":1}",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::File(_)));
    }

    #[test]
    fn test_ingest_requires_tenant() {
        assert!(Cli::try_parse_from(["filerepo", "ingest", "./a.txt"]).is_err());
    }
}

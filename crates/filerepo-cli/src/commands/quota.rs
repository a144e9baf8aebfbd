//! Tenant quota inspection.

use clap::Args;

use filerepo_core::config::AppConfig;
use filerepo_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the quota command
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Tenant code
    #[arg(short, long)]
    pub tenant: String,
}

/// Execute the quota command
pub async fn execute(
    args: &QuotaArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::Services::connect(config).await?;
    let result = async {
        let ctx = services.tenants.context(&args.tenant).await?;
        services.quota.snapshot(&ctx).await
    }
    .await;
    services.close().await;

    output::print_quota(&args.tenant, &result?, format);
    Ok(())
}

//! Database migration command.

use filerepo_core::config::AppConfig;
use filerepo_core::error::AppError;
use filerepo_database::DatabasePool;

use crate::output;

/// Apply all pending migrations.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    let result = filerepo_database::migration::run_migrations(db.pool()).await;
    db.close().await;
    result?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}

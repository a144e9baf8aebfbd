//! Tenant repository implementation.

use sqlx::PgPool;

use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::result::AppResult;
use filerepo_entity::tenant::Tenant;

/// Read access to tenants. Tenant provisioning happens outside this system.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tenant by its code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }
}

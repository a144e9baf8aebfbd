//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::config::TenantConfig;

/// An isolated customer of the repository.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Short, path-safe tenant code used in storage paths and cache keys.
    pub code: String,
    /// Ingestion rules and quotas for this tenant.
    #[sqlx(json)]
    pub configuration: TenantConfig,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Build a tenant with fresh timestamps.
    pub fn new(code: impl Into<String>, configuration: TenantConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            configuration,
            created_at: now,
            updated_at: now,
        }
    }
}

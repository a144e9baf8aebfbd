//! Tenant service: resolve a tenant and its configuration by code.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use filerepo_cache::CacheManager;
use filerepo_cache::keys;
use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_core::traits::cache::CacheProvider;
use filerepo_database::MetadataStore;
use filerepo_entity::tenant::Tenant;

use crate::context::TenantContext;

/// Cache-aside tenant lookup.
#[derive(Debug, Clone)]
pub struct TenantService {
    store: Arc<dyn MetadataStore>,
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl TenantService {
    pub fn new(store: Arc<dyn MetadataStore>, cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Resolve a tenant by code. Unknown codes fail with `NotFound`.
    pub async fn get_by_code(&self, code: &str) -> AppResult<Tenant> {
        let key = keys::tenant_by_code(code);
        match self.cache.get_json::<Tenant>(&key).await {
            Ok(Some(tenant)) => return Ok(tenant),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Tenant cache read failed"),
        }

        let tenant = self
            .store
            .find_tenant_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant '{code}' not found")))?;

        if let Err(e) = self.cache.set_json(&key, &tenant, self.ttl).await {
            warn!(key = %key, error = %e, "Tenant cache write failed");
        }
        Ok(tenant)
    }

    /// Resolve a tenant by code into a request context.
    pub async fn context(&self, code: &str) -> AppResult<TenantContext> {
        self.get_by_code(code).await.map(TenantContext::from)
    }
}

//! Tenant context carried through every ingestion and file operation.

use uuid::Uuid;

use filerepo_entity::tenant::{Tenant, TenantConfig};

/// The resolved tenant an operation acts on behalf of.
///
/// Built once per request from the tenant record so that every step sees
/// the same configuration snapshot.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub tenant_code: String,
    pub config: TenantConfig,
}

impl From<Tenant> for TenantContext {
    fn from(tenant: Tenant) -> Self {
        Self {
            tenant_id: tenant.id,
            tenant_code: tenant.code,
            config: tenant.configuration,
        }
    }
}

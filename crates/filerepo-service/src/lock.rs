//! Upload Lock Manager: per-(tenant, filename) mutual exclusion.
//!
//! The lock is a cache key written with an atomic set-if-absent and a TTL.
//! Contention is rejected immediately; nobody waits. The TTL bounds how long
//! a crashed holder can block the key. Each holder writes a unique token and
//! release only deletes the key while it still holds that token, so a holder
//! whose TTL lapsed cannot remove a successor's lock.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use filerepo_cache::CacheManager;
use filerepo_cache::keys;
use filerepo_core::error::{AppError, ErrorKind};
use filerepo_core::result::AppResult;
use filerepo_core::traits::cache::CacheProvider;

/// Hands out [`UploadLock`]s.
#[derive(Debug, Clone)]
pub struct UploadLockManager {
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl UploadLockManager {
    pub fn new(cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Try to take the lock for `(tenant_id, file_name)`.
    ///
    /// Fails with `Conflict` when another upload holds it. A cache outage
    /// fails with `ServiceUnavailable`, since exclusion cannot be promised.
    pub async fn try_acquire(&self, tenant_id: Uuid, file_name: &str) -> AppResult<UploadLock> {
        let key = keys::upload_lock(tenant_id, file_name);
        let token = Uuid::new_v4().to_string();

        let acquired = self
            .cache
            .set_nx(&key, &token, self.ttl)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ServiceUnavailable,
                    "Upload lock service unavailable",
                    e,
                )
            })?;

        if !acquired {
            debug!(%tenant_id, file_name, "Upload lock contended");
            return Err(AppError::conflict(format!(
                "Another upload of '{file_name}' is in progress"
            )));
        }

        debug!(%tenant_id, file_name, "Upload lock acquired");
        Ok(UploadLock {
            cache: Arc::clone(&self.cache),
            key,
            token,
            released: false,
        })
    }
}

/// A held upload lock.
///
/// Call [`UploadLock::release`] on every normal exit. If the guard is dropped
/// without it (for example when the owning future is cancelled), release is
/// spawned onto the current runtime instead.
#[derive(Debug)]
pub struct UploadLock {
    cache: Arc<CacheManager>,
    key: String,
    token: String,
    released: bool,
}

impl UploadLock {
    /// Release the lock. Failures are logged; the TTL reclaims the key.
    pub async fn release(mut self) {
        self.released = true;
        release_key(&self.cache, &self.key, &self.token).await;
    }
}

impl Drop for UploadLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let cache = Arc::clone(&self.cache);
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { release_key(&cache, &key, &token).await });
            }
            Err(_) => warn!(key = %key, "Upload lock dropped outside a runtime; left to expire"),
        }
    }
}

async fn release_key(cache: &CacheManager, key: &str, token: &str) {
    match cache.compare_and_delete(key, token).await {
        Ok(true) => debug!(key = %key, "Upload lock released"),
        Ok(false) => warn!(key = %key, "Upload lock expired or taken over before release"),
        Err(e) => warn!(key = %key, error = %e, "Failed to release upload lock"),
    }
}

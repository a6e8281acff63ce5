//! In-memory caching using moka
//!
//! Caches the service catalogue for quoting. Services change rarely and every
//! write through the API invalidates the affected entry. Coupons are never
//! cached: validation must see the current row.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::models::Service;

const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Application cache holding service records
#[derive(Clone)]
pub struct AppCache {
    /// Services (id -> Service)
    pub services: Cache<Uuid, Arc<Service>>,
}

impl AppCache {
    /// Create a new cache instance with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            // Catalogue is small: a few dozen cylinder sizes and visit types
            services: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .time_to_idle(ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            services_size: self.services.entry_count(),
        }
    }

    pub async fn insert_service(&self, service: Service) {
        self.services.insert(service.id, Arc::new(service)).await;
    }

    /// Invalidate a single service after it was written
    pub async fn invalidate_service(&self, id: Uuid) {
        self.services.invalidate(&id).await;
        info!("Cache invalidated for service: {}", id);
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.services.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub services_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every `every`.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, every: Duration) {
    let mut interval = interval(every);
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Load the active catalogue
async fn warm_cache(cache: &AppCache, pool: &PgPool) {
    match db::services::list(pool, true).await {
        Ok(services) => {
            let count = services.len();
            for service in services {
                cache.insert_service(service).await;
            }
            info!("Service cache warmed with {} entries", count);
        }
        Err(e) => warn!("Failed to warm service cache: {}", e),
    }
}

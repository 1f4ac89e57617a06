//! In-memory caching using moka
//!
//! Reference tables change rarely, so the whole snapshot is cached and shared
//! by every estimate until the TTL expires or the warmer replaces it.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::estimate::services;
use crate::estimate::{Prefecture, ReferenceTables};

const REFERENCE_KEY: &str = "reference";
const PREFECTURES_KEY: &str = "prefectures";

/// Application cache holding reference data snapshots
#[derive(Clone)]
pub struct AppCache {
    /// Pricing reference tables (singleton)
    pub reference: Cache<String, Arc<ReferenceTables>>,
    /// Prefecture list (singleton)
    pub prefectures: Cache<String, Arc<Vec<Prefecture>>>,
}

impl AppCache {
    /// Create a new cache instance with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            reference: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            prefectures: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn get_reference(&self) -> Option<Arc<ReferenceTables>> {
        self.reference.get(REFERENCE_KEY).await
    }

    pub async fn put_reference(&self, tables: Arc<ReferenceTables>) {
        self.reference.insert(REFERENCE_KEY.to_string(), tables).await;
    }

    pub async fn get_prefectures(&self) -> Option<Arc<Vec<Prefecture>>> {
        self.prefectures.get(PREFECTURES_KEY).await
    }

    pub async fn put_prefectures(&self, prefectures: Arc<Vec<Prefecture>>) {
        self.prefectures
            .insert(PREFECTURES_KEY.to_string(), prefectures)
            .await;
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            reference_cached: self.reference.entry_count() > 0,
            prefectures_cached: self.prefectures.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.reference.invalidate_all();
        self.prefectures.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics served by `GET /api/cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub reference_cached: bool,
    pub prefectures_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes at the given period.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, period: Duration) {
    let mut interval = interval(period);
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Reload reference tables and prefectures from the database
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match services::load_reference_tables(db).await {
        Ok(tables) => cache.put_reference(Arc::new(tables)).await,
        Err(e) => warn!("Failed to warm reference cache: {}", e),
    }

    match services::load_prefectures(db).await {
        Ok(prefectures) => cache.put_prefectures(Arc::new(prefectures)).await,
        Err(e) => warn!("Failed to warm prefecture cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

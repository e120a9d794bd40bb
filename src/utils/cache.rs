//! In-Memory Score Cache
//!
//! Thread-safe TTL cache for computed composite scores, keyed by
//! `entity_type:id`. DashMap keeps lookups lock-free under concurrent
//! API load; hit/miss counters feed the stats endpoint.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::types::{EntityType, RiskLevel};

/// Default TTL: 5 minutes
const DEFAULT_TTL_SECS: u64 = 300;

/// A cached scoring result, ready to serve without recomputation
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRecord {
    pub entity_type: EntityType,
    pub entity_id: u32,
    pub score: f64,
    pub level: RiskLevel,
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    record: ScoreRecord,
    created_at: Instant,
    ttl_secs: u64,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > Duration::from_secs(self.ttl_secs)
    }

    fn remaining_ttl(&self) -> u64 {
        self.ttl_secs.saturating_sub(self.created_at.elapsed().as_secs())
    }
}

/// Shared score cache with TTL expiration
#[derive(Clone)]
pub struct ScoreCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl_secs: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl_secs,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn key(entity_type: EntityType, entity_id: u32) -> String {
        format!("{}:{}", entity_type.as_str(), entity_id)
    }

    /// Get with TTL validation; expired entries are evicted on read
    pub fn get(&self, entity_type: EntityType, entity_id: u32) -> Option<ScoreRecord> {
        let key = Self::key(entity_type, entity_id);

        if let Some(entry) = self.store.get(&key) {
            if entry.is_expired() {
                drop(entry); // release read lock before removal
                self.store.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ CACHE HIT: {} (TTL: {}s remaining)", key, entry.remaining_ttl());
                Some(entry.record.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            None
        }
    }

    pub fn set(&self, record: ScoreRecord) {
        let key = Self::key(record.entity_type, record.entity_id);
        let entry = CacheEntry {
            record,
            created_at: Instant::now(),
            ttl_secs: self.ttl_secs,
        };
        self.store.insert(key.clone(), entry);
        debug!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl_secs);
    }

    /// Drop a single entity's cached score, e.g. after its inputs change
    #[allow(dead_code)]
    pub fn invalidate(&self, entity_type: EntityType, entity_id: u32) {
        let key = Self::key(entity_type, entity_id);
        self.store.remove(&key);
        debug!("🗑️ CACHE INVALIDATE: {}", key);
    }

    /// Remove all expired entries; returns how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before - self.store.len();
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

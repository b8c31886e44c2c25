use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{BoundingBox, Poi};

/// Consider cache entries stale after 1 hour.
pub const CACHE_TTL_MINUTES: i64 = 60;

/// POIs fetched for one exact bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub pois: Vec<Poi>,
    pub cached_at: DateTime<Utc>,
    pub bounds: BoundingBox,
}

impl CacheEntry {
    pub fn new(bounds: BoundingBox, pois: Vec<Poi>, cached_at: DateTime<Utc>) -> Self {
        Self {
            pois,
            cached_at,
            bounds,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let minutes = self.age(now).num_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else {
            format!("{}h ago", minutes / 60)
        }
    }
}

/// Session-scoped POI cache keyed by exact bounding box.
///
/// Entries are never evicted: a stale entry stays in the map until it is
/// overwritten or the whole cache is cleared, it is just never reused.
#[derive(Debug, Clone)]
pub struct PoiCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for PoiCache {
    fn default() -> Self {
        Self::new(Duration::minutes(CACHE_TTL_MINUTES))
    }
}

impl PoiCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry for `bounds` if one exists and is still fresh at `now`.
    pub fn get_fresh(&self, bounds: &BoundingBox, now: DateTime<Utc>) -> Option<&CacheEntry> {
        let key = bounds.cache_key();
        match self.entries.get(&key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => Some(entry),
            Some(entry) => {
                debug!(key = %key, age = %entry.age_display(now), "Cache entry is stale");
                None
            }
            None => None,
        }
    }

    /// Any entry for `bounds`, fresh or not.
    pub fn get(&self, bounds: &BoundingBox) -> Option<&CacheEntry> {
        self.entries.get(&bounds.cache_key())
    }

    /// Create or overwrite the entry for `bounds`.
    pub fn insert(&mut self, bounds: BoundingBox, pois: Vec<Poi>, now: DateTime<Utc>) {
        let key = bounds.cache_key();
        let count = pois.len();
        self.entries.insert(key.clone(), CacheEntry::new(bounds, pois, now));
        debug!(
            key = %key,
            count,
            entries = self.entries.len(),
            stale = self.stale_count(now),
            "Caching POIs"
        );
    }

    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "Clearing POI cache");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that can no longer be reused but still occupy memory.
    pub fn stale_count(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_fresh(now, self.ttl))
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================

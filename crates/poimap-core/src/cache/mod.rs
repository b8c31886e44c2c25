//! In-memory session cache for POI queries.
//!
//! This module provides `PoiCache`, which maps an exact bounding box to the
//! POIs fetched for it. Entries are reused for one hour and are never
//! persisted or evicted; they live until the session ends or the cache is
//! cleared.

pub mod manager;

pub use manager::{CacheEntry, PoiCache, CACHE_TTL_MINUTES};

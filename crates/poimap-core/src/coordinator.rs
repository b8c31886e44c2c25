//! Bounding-box fetch coordinator.
//!
//! `PoiCoordinator` resolves a bounding box into a POI list: it serves fresh
//! session-cache entries directly, falls back to the `PoiSource` otherwise,
//! and publishes the result into the shared state through the request
//! lifecycle transitions on `PoiQueryState`.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::api::PoiSource;
use crate::models::{BoundingBox, Poi, PoiResponse};
use crate::store::{FetchOutcome, PoiQueryState, PoiSnapshot, SharedState};
use crate::utils::days_before;

/// Number of days to look back for POI updates.
pub const POI_LOOKBACK_DAYS: i64 = 30;

/// Where a resolved POI list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Cache,
    Network,
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub pois: Vec<Poi>,
    pub origin: FetchOrigin,
    pub outcome: FetchOutcome,
}

/// Lower `from_date` bound sent with every network request.
pub fn from_date(today: NaiveDate) -> NaiveDate {
    days_before(today, POI_LOOKBACK_DAYS)
}

pub struct PoiCoordinator<S: PoiSource> {
    source: S,
    state: SharedState,
}

impl<S: PoiSource> PoiCoordinator<S> {
    pub fn new(source: S) -> Self {
        Self::with_state(source, PoiQueryState::default().shared())
    }

    /// Build a coordinator around an existing state handle.
    pub fn with_state(source: S, state: SharedState) -> Self {
        Self { source, state }
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn snapshot(&self) -> PoiSnapshot {
        self.state.read().await.snapshot()
    }

    /// Resolve `bounds` into a POI list and publish it.
    ///
    /// Errors are recorded in the shared state before being returned.
    pub async fn fetch_pois(&self, bounds: &BoundingBox) -> Result<FetchReport> {
        // Status change and cache lookup happen under one write lock
        let (request_id, cached) = {
            let mut state = self.state.write().await;
            let request_id = state.begin_request();
            let cached = state
                .cache
                .get_fresh(bounds, Utc::now())
                .map(|entry| entry.pois.clone());
            (request_id, cached)
        };

        let (response, origin) = match cached {
            Some(pois) => {
                debug!(request_id, key = %bounds.cache_key(), count = pois.len(), "POI cache hit");
                (PoiResponse::ok(pois), FetchOrigin::Cache)
            }
            None => {
                debug!(request_id, key = %bounds.cache_key(), "POI cache miss, fetching");
                let from = from_date(Utc::now().date_naive());
                match self.source.fetch_pois(bounds, from).await {
                    Ok(response) => (response, FetchOrigin::Network),
                    Err(e) => {
                        let message = format!("{:#}", e);
                        warn!(request_id, error = %message, "Failed to fetch POIs");
                        self.state.write().await.fail(request_id, &message);
                        return Err(e);
                    }
                }
            }
        };

        let pois = response.items().to_vec();
        let outcome = self
            .state
            .write()
            .await
            .resolve(request_id, *bounds, response, Utc::now());

        info!(
            request_id,
            count = pois.len(),
            ?origin,
            ?outcome,
            "POI request resolved"
        );

        Ok(FetchReport {
            pois,
            origin,
            outcome,
        })
    }

    /// Remove every cache entry without touching the displayed list or status.
    pub async fn clear_cache(&self) {
        self.state.write().await.clear_cache();
        info!("POI cache cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Shared POI query state.
//!
//! `PoiQueryState` holds what the rendering layer reads (the displayed POIs,
//! request status and last error) together with the session cache. It is
//! shared through a `SharedState` handle and only mutated by the request
//! lifecycle transitions below, which the coordinator drives.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::PoiCache;
use crate::models::{pois_changed, BoundingBox, Poi, PoiResponse};

/// Handle to the state shared between the coordinator and its readers.
pub type SharedState = Arc<RwLock<PoiQueryState>>;

/// Error message recorded when a failure renders as an empty string.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch POIs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::Loading => write!(f, "loading"),
            RequestStatus::Succeeded => write!(f, "succeeded"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What resolving a request did to the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list differed and replaced the displayed one.
    Updated,
    /// The list matched the displayed one; nothing was written.
    Unchanged,
    /// A newer request started before this one resolved; the result was dropped.
    Superseded,
}

/// Read-only copy of the fields the rendering layer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiSnapshot {
    pub pois: Vec<Poi>,
    pub status: RequestStatus,
    pub error: Option<String>,
    pub revision: u64,
}

#[derive(Debug, Default)]
pub struct PoiQueryState {
    pois: PoiResponse,
    status: RequestStatus,
    error: Option<String>,
    pub(crate) cache: PoiCache,
    /// Bumped every time the displayed list is replaced or cleared.
    revision: u64,
    latest_request: u64,
}

impl PoiQueryState {
    pub fn new(cache: PoiCache) -> Self {
        Self {
            cache,
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn items(&self) -> &[Poi] {
        self.pois.items()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Message of the last failure. Not cleared by later successes.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cache(&self) -> &PoiCache {
        &self.cache
    }

    pub fn snapshot(&self) -> PoiSnapshot {
        PoiSnapshot {
            pois: self.pois.items().to_vec(),
            status: self.status,
            error: self.error.clone(),
            revision: self.revision,
        }
    }

    /// Enter `Loading` and return the id of the new request.
    pub fn begin_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.status = RequestStatus::Loading;
        self.latest_request
    }

    pub fn is_latest(&self, request_id: u64) -> bool {
        request_id == self.latest_request
    }

    /// Apply a successful response for `bounds`.
    ///
    /// The displayed list and the cache entry for `bounds` are only written
    /// when the incoming list differs from what is displayed.
    pub fn resolve(
        &mut self,
        request_id: u64,
        bounds: BoundingBox,
        response: PoiResponse,
        now: DateTime<Utc>,
    ) -> FetchOutcome {
        if !self.is_latest(request_id) {
            debug!(request_id, latest = self.latest_request, "Dropping superseded POI response");
            return FetchOutcome::Superseded;
        }

        self.status = RequestStatus::Succeeded;

        if !pois_changed(self.pois.items(), response.items()) {
            debug!(request_id, count = response.items().len(), "POIs unchanged");
            return FetchOutcome::Unchanged;
        }

        self.cache.insert(bounds, response.items().to_vec(), now);
        self.pois = response;
        self.revision += 1;
        FetchOutcome::Updated
    }

    /// Record a failed request: clear the displayed list, keep the cache.
    pub fn fail(&mut self, request_id: u64, message: &str) -> FetchOutcome {
        if !self.is_latest(request_id) {
            debug!(request_id, latest = self.latest_request, "Dropping superseded POI failure");
            return FetchOutcome::Superseded;
        }

        self.status = RequestStatus::Failed;
        self.error = Some(if message.is_empty() {
            DEFAULT_FETCH_ERROR.to_string()
        } else {
            message.to_string()
        });
        self.pois = PoiResponse::default();
        self.revision += 1;
        FetchOutcome::Updated
    }

    /// Drop every cache entry; displayed list and status are left alone.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

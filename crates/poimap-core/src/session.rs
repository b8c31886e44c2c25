//! Map session: the core's surface towards the rendering layer.
//!
//! A `MapSession` owns one `BoundsTracker` and shares one `PoiCoordinator`
//! with the fetch tasks the tracker spawns. The rendering layer reports
//! viewport changes, clears the cache, and reads snapshots or the markers
//! visible in the current viewport.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::api::{ApiClient, PoiSource};
use crate::cache::PoiCache;
use crate::config::Config;
use crate::coordinator::PoiCoordinator;
use crate::models::{BoundingBox, Poi};
use crate::store::{PoiQueryState, PoiSnapshot, RequestStatus};
use crate::tracker::BoundsTracker;

pub struct MapSession<S: PoiSource + 'static> {
    coordinator: Arc<PoiCoordinator<S>>,
    tracker: BoundsTracker,
    /// Fetch tasks spawned by the debounced action.
    spawned: mpsc::UnboundedReceiver<JoinHandle<()>>,
    in_flight: Vec<JoinHandle<()>>,
}

impl MapSession<ApiClient> {
    /// Build a session backed by the HTTP API described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::with_timeout(&config.api_base_url()?, config.request_timeout())?;
        let state = PoiQueryState::new(PoiCache::new(config.cache_ttl())).shared();
        let coordinator = Arc::new(PoiCoordinator::with_state(client, state));
        Ok(Self::new(coordinator, config.debounce()))
    }
}

impl<S: PoiSource + 'static> MapSession<S> {
    pub fn new(coordinator: Arc<PoiCoordinator<S>>, debounce: std::time::Duration) -> Self {
        let fetcher = Arc::clone(&coordinator);
        let (spawned_tx, spawned) = mpsc::unbounded_channel();
        let tracker = BoundsTracker::new(debounce, move |bounds| {
            let coordinator = Arc::clone(&fetcher);
            // Runs detached so a later debounce reset never cancels it
            let handle = tokio::spawn(async move {
                if let Err(e) = coordinator.fetch_pois(&bounds).await {
                    error!(error = %format!("{:#}", e), key = %bounds.cache_key(), "Debounced POI fetch failed");
                }
            });
            // The receiver only goes away with the session
            let _ = spawned_tx.send(handle);
        });
        Self {
            coordinator,
            tracker,
            spawned,
            in_flight: Vec::new(),
        }
    }

    fn collect_spawned(&mut self) {
        while let Ok(handle) = self.spawned.try_recv() {
            self.in_flight.push(handle);
        }
        self.in_flight.retain(|handle| !handle.is_finished());
    }

    /// Wait for the pending debounce to fire and every spawned fetch to finish.
    pub async fn settle(&mut self) {
        self.tracker.wait_for_pending_fetch().await;
        self.collect_spawned();
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "POI fetch task did not complete");
            }
        }
    }

    pub fn coordinator(&self) -> &Arc<PoiCoordinator<S>> {
        &self.coordinator
    }

    pub fn viewport(&self) -> Option<BoundingBox> {
        self.tracker.viewport()
    }

    pub fn last_zoom(&self) -> Option<f64> {
        self.tracker.last_zoom()
    }

    /// Report a settled viewport. Returns true if a fetch was scheduled.
    pub fn trigger_viewport_change(&mut self, bounds: BoundingBox, zoom: f64) -> bool {
        self.collect_spawned();
        self.tracker.on_viewport_change(bounds, zoom)
    }

    /// Whether a debounced fetch is waiting to fire.
    pub fn is_fetch_pending(&self) -> bool {
        self.tracker.is_fetch_pending()
    }

    pub async fn clear_cache(&self) {
        self.coordinator.clear_cache().await;
    }

    pub async fn snapshot(&self) -> PoiSnapshot {
        self.coordinator.snapshot().await
    }

    /// Displayed POIs inside the tracked viewport.
    ///
    /// Empty unless the last request succeeded and a viewport has been tracked.
    pub async fn visible_pois(&self) -> Vec<Poi> {
        let Some(viewport) = self.tracker.viewport() else {
            return Vec::new();
        };
        let state = self.coordinator.state();
        let state = state.read().await;
        if state.status() != RequestStatus::Succeeded {
            return Vec::new();
        }

        let visible: Vec<Poi> = state
            .items()
            .iter()
            .filter(|poi| viewport.contains(poi.latitude, poi.longitude))
            .cloned()
            .collect();
        debug!(visible = visible.len(), total = state.items().len(), "Filtered visible POIs");
        visible
    }
}

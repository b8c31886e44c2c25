//! Viewport tracking.
//!
//! `BoundsTracker` turns a stream of viewport settle events into discrete,
//! rate-limited fetch triggers. Only zoom changes of more than one level (or
//! the very first event) count as significant; accepted bounds are clamped
//! to the valid coordinate range and handed to a debounced action.

use std::time::Duration;

use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::models::BoundingBox;

/// Default debounce window for fetch triggers.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Minimum zoom delta (exclusive) that triggers a new fetch.
pub const ZOOM_TRIGGER_DELTA: f64 = 1.0;

pub struct BoundsTracker {
    last_zoom: Option<f64>,
    viewport: Option<BoundingBox>,
    debouncer: Debouncer<BoundingBox>,
}

impl BoundsTracker {
    /// Create a tracker that forwards clamped bounds to `on_fetch` after `debounce`.
    pub fn new(debounce: Duration, on_fetch: impl Fn(BoundingBox) + Send + Sync + 'static) -> Self {
        Self {
            last_zoom: None,
            viewport: None,
            debouncer: Debouncer::new(debounce, move |bounds: BoundingBox| on_fetch(bounds.clamped())),
        }
    }

    pub fn last_zoom(&self) -> Option<f64> {
        self.last_zoom
    }

    /// Bounds of the last triggering viewport, used to filter visible markers.
    pub fn viewport(&self) -> Option<BoundingBox> {
        self.viewport
    }

    /// Whether a viewport at `zoom` should trigger a fetch.
    pub fn is_significant(&self, zoom: f64) -> bool {
        match self.last_zoom {
            None => true,
            Some(last) => (zoom - last).abs() > ZOOM_TRIGGER_DELTA,
        }
    }

    /// Handle a viewport settle event. Returns true if a fetch was scheduled.
    ///
    /// Panning at an unchanged zoom level never schedules a fetch once a
    /// fetch has been triggered at that level.
    pub fn on_viewport_change(&mut self, bounds: BoundingBox, zoom: f64) -> bool {
        if !zoom.is_finite() {
            warn!(zoom, "Ignoring viewport change with non-finite zoom");
            return false;
        }
        if !self.is_significant(zoom) {
            debug!(zoom, last_zoom = ?self.last_zoom, "Viewport change below zoom threshold");
            return false;
        }

        debug!(zoom, key = %bounds.cache_key(), "Viewport change triggers fetch");
        self.last_zoom = Some(zoom);
        self.viewport = Some(bounds);
        self.debouncer.call(bounds);
        true
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait until a scheduled fetch, if any, has been handed to the action.
    pub async fn wait_for_pending_fetch(&mut self) {
        self.debouncer.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recording_tracker() -> (BoundsTracker, Arc<Mutex<Vec<BoundingBox>>>) {
        let fetched = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fetched);
        let tracker = BoundsTracker::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS), move |bounds| {
            sink.lock().unwrap().push(bounds);
        });
        (tracker, fetched)
    }

    fn bounds(offset: f64) -> BoundingBox {
        BoundingBox::from_coords(40.0 + offset, -71.0, 42.0 + offset, -69.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_event_triggers() {
        let (mut tracker, fetched) = recording_tracker();
        assert!(tracker.on_viewport_change(bounds(0.0), 6.0));
        assert_eq!(tracker.last_zoom(), Some(6.0));
        assert_eq!(tracker.viewport(), Some(bounds(0.0)));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*fetched.lock().unwrap(), vec![bounds(0.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_finite_zoom_is_ignored() {
        let (mut tracker, fetched) = recording_tracker();
        assert!(!tracker.on_viewport_change(bounds(0.0), f64::NAN));
        assert!(!tracker.on_viewport_change(bounds(0.0), f64::INFINITY));
        assert_eq!(tracker.last_zoom(), None);
        assert_eq!(tracker.viewport(), None);

        // A later valid event still counts as the first
        assert!(tracker.on_viewport_change(bounds(1.0), 4.0));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*fetched.lock().unwrap(), vec![bounds(1.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_zoom_delta_is_ignored() {
        let (mut tracker, fetched) = recording_tracker();
        tracker.on_viewport_change(bounds(0.0), 6.0);
        tokio::time::sleep(Duration::from_millis(600)).await;

        // Pan at the same zoom and zoom by exactly one level
        assert!(!tracker.on_viewport_change(bounds(1.0), 6.0));
        assert!(!tracker.on_viewport_change(bounds(2.0), 7.0));
        assert!(!tracker.on_viewport_change(bounds(2.0), 5.0));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(fetched.lock().unwrap().len(), 1);
        assert_eq!(tracker.viewport(), Some(bounds(0.0)));
        assert_eq!(tracker.last_zoom(), Some(6.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_large_zoom_delta_triggers() {
        let (mut tracker, fetched) = recording_tracker();
        tracker.on_viewport_change(bounds(0.0), 6.0);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(tracker.on_viewport_change(bounds(1.0), 7.5));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(tracker.on_viewport_change(bounds(2.0), 4.0));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*fetched.lock().unwrap(), vec![bounds(0.0), bounds(1.0), bounds(2.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_triggers_debounce_to_last_bounds() {
        let (mut tracker, fetched) = recording_tracker();

        assert!(tracker.on_viewport_change(bounds(0.0), 3.0));
        tokio::time::advance(Duration::from_millis(40)).await;
        assert!(tracker.on_viewport_change(bounds(1.0), 6.0));
        tokio::time::advance(Duration::from_millis(40)).await;
        assert!(tracker.on_viewport_change(bounds(2.0), 9.0));
        assert!(tracker.is_fetch_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*fetched.lock().unwrap(), vec![bounds(2.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forwarded_bounds_are_clamped() {
        let (mut tracker, fetched) = recording_tracker();
        let raw = BoundingBox::from_coords(80.0, -190.0, 95.0, 10.0);

        tracker.on_viewport_change(raw, 2.0);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let forwarded = fetched.lock().unwrap()[0];
        assert_eq!(forwarded.north_east.lat, 90.0);
        assert_eq!(forwarded.south_west.lng, -180.0);
        assert_eq!(forwarded.south_west.lat, 80.0);

        // The tracked viewport keeps the raw bounds
        assert_eq!(tracker.viewport(), Some(raw));
    }
}

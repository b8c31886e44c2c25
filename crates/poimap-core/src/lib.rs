//! Core library for poimap.
//!
//! Provides the viewport-driven POI fetching used by map front ends:
//!
//! - `api`: the `PoiSource` seam and the reqwest-backed `ApiClient`
//! - `cache`: the time-bounded in-memory session cache
//! - `store`: shared query state and its request lifecycle
//! - `coordinator`: cache lookup, network fallback and change detection
//! - `tracker` / `debounce`: turning viewport events into fetch triggers
//! - `session`: the surface a rendering layer talks to

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod models;
pub mod session;
pub mod store;
pub mod tracker;
pub mod utils;

pub use api::{ApiClient, ApiError, PoiSource};
pub use cache::PoiCache;
pub use config::Config;
pub use coordinator::{FetchOrigin, FetchReport, PoiCoordinator};
pub use models::{BoundingBox, LatLng, Poi, PoiResponse, PoiType};
pub use session::MapSession;
pub use store::{FetchOutcome, PoiQueryState, PoiSnapshot, RequestStatus, SharedState};
pub use tracker::BoundsTracker;

//! Data models for POI map entities.
//!
//! This module contains the data structures shared by the API client,
//! session cache and rendering layer:
//!
//! - `Poi`, `PoiType`: points of interest and their categories
//! - `PoiResponse`: the `{status, data: {items}}` envelope from the POI endpoint
//! - `LatLng`, `BoundingBox`: viewport bounds and cache keys

pub mod bounds;
pub mod poi;

pub use bounds::{BoundingBox, LatLng};
pub use poi::{pois_changed, Poi, PoiItems, PoiResponse, PoiType};

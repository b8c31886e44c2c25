//! Geographic bounding boxes used as fetch parameters and cache keys.

use serde::{Deserialize, Serialize};

/// Valid latitude range in degrees (WGS84).
const MAX_LATITUDE: f64 = 90.0;

/// Valid longitude range in degrees (WGS84).
const MAX_LONGITUDE: f64 = 180.0;

/// A single coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Clamp latitude to [-90, 90] and longitude to [-180, 180].
    pub fn clamped(&self) -> Self {
        Self {
            lat: self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            lng: self.lng.clamp(-MAX_LONGITUDE, MAX_LONGITUDE),
        }
    }
}

/// Rectangular region defined by its southwest and northeast corners.
///
/// Boxes are compared by exact coordinates: two boxes that overlap or contain
/// one another are still different cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct BoundingBox {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl BoundingBox {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Build a box from raw `sw_lat, sw_lng, ne_lat, ne_lng` values.
    pub fn from_coords(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Self {
        Self::new(LatLng::new(sw_lat, sw_lng), LatLng::new(ne_lat, ne_lng))
    }

    /// Canonical cache key: `swLat,swLng,neLat,neLng` in shortest round-trip form.
    pub fn cache_key(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.lat, self.south_west.lng, self.north_east.lat, self.north_east.lng
        )
    }

    /// Clamp each corner independently into the valid coordinate range.
    ///
    /// The box is not re-normalised, so clamping near the poles or the
    /// antimeridian may yield a degenerate or inverted box.
    pub fn clamped(&self) -> Self {
        Self {
            south_west: self.south_west.clamped(),
            north_east: self.north_east.clamped(),
        }
    }

    /// Inclusive containment check for marker visibility.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south_west.lat
            && lat <= self.north_east.lat
            && lng >= self.south_west.lng
            && lng <= self.north_east.lng
    }
}

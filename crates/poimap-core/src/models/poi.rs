use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub enum PoiType {
    Marina,
    Anchorage,
    BoatRamp,
    // Unknown wire values land here
    #[serde(other)]
    Other,
}

impl PoiType {
    /// Glyph drawn for this category's map marker.
    pub fn marker_icon(&self) -> &'static str {
        match self {
            PoiType::Marina => "⚓",
            PoiType::Anchorage => "🔵",
            PoiType::BoatRamp => "🚤",
            PoiType::Other => "📍",
        }
    }
}

impl std::fmt::Display for PoiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoiType::Marina => write!(f, "Marina"),
            PoiType::Anchorage => write!(f, "Anchorage"),
            PoiType::BoatRamp => write!(f, "Boat Ramp"),
            PoiType::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Poi {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub poi_type: PoiType,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub info: HashMap<String, serde_json::Value>,
    pub updated_at: String,
}

impl Poi {
    /// Whether two POIs would render the same marker: same id at the same position.
    pub fn same_marker(&self, other: &Poi) -> bool {
        self.id == other.id && self.latitude == other.latitude && self.longitude == other.longitude
    }

    /// Coordinates formatted for an info panel.
    pub fn position_display(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Partner label, skipping empty strings.
    pub fn partner_display(&self) -> Option<&str> {
        self.partner.as_deref().filter(|p| !p.is_empty())
    }

    pub fn updated_at_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Returns true unless both lists hold the same markers in the same order.
///
/// Comparison is positional: the same POIs in a different order count as a change.
pub fn pois_changed(current: &[Poi], incoming: &[Poi]) -> bool {
    current.len() != incoming.len()
        || incoming
            .iter()
            .zip(current)
            .any(|(new_poi, current_poi)| !new_poi.same_marker(current_poi))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct PoiItems {
    pub items: Vec<Poi>,
}

/// Envelope returned by the POI endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct PoiResponse {
    #[serde(default)]
    pub status: String,
    pub data: PoiItems,
}

impl PoiResponse {
    /// Response shape used for lists served from the session cache.
    pub fn ok(items: Vec<Poi>) -> Self {
        Self {
            status: "ok".to_string(),
            data: PoiItems { items },
        }
    }

    pub fn items(&self) -> &[Poi] {
        &self.data.items
    }
}

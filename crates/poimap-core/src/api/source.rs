use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{BoundingBox, PoiResponse};

/// Anything that can answer a bounding-box POI query.
///
/// `ApiClient` is the network-backed implementation; the coordinator only
/// depends on this trait.
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Fetch POIs inside `bounds` updated on or after `from_date`.
    async fn fetch_pois(&self, bounds: &BoundingBox, from_date: NaiveDate) -> Result<PoiResponse>;
}

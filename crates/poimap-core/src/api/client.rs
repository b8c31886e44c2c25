//! API client for the POI backend.
//!
//! This module provides the `ApiClient` struct for querying points of
//! interest inside a bounding box.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{BoundingBox, PoiResponse};
use crate::utils::{format_coordinate, format_iso_date};

use super::{ApiError, PoiSource};

// ============================================================================
// Constants
// ============================================================================

/// Path of the bounding-box POI listing, relative to the base URL.
const POIS_PATH: &str = "/optimized_lists/pois/upsert";

/// Default HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the POI backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            anyhow::bail!("API base URL is empty");
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a bounding-box POI request.
    pub fn query_params(bounds: &BoundingBox, from_date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("sw_latitude", format_coordinate(bounds.south_west.lat)),
            ("sw_longitude", format_coordinate(bounds.south_west.lng)),
            ("ne_latitude", format_coordinate(bounds.north_east.lat)),
            ("ne_longitude", format_coordinate(bounds.north_east.lng)),
            ("from_date", format_iso_date(from_date)),
        ]
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

#[async_trait]
impl PoiSource for ApiClient {
    async fn fetch_pois(&self, bounds: &BoundingBox, from_date: NaiveDate) -> Result<PoiResponse> {
        let url = format!("{}{}", self.base_url, POIS_PATH);
        let params = Self::query_params(bounds, from_date);
        debug!(?params, "Fetching POIs");

        let response: PoiResponse = self.get(&url, &params).await?;
        debug!(
            status = %response.status,
            count = response.items().len(),
            "POI response received"
        );
        Ok(response)
    }
}

//! REST API client module for the POI backend.
//!
//! This module provides the `PoiSource` trait the fetch coordinator depends
//! on, and `ApiClient`, its reqwest-backed implementation that queries the
//! bounding-box POI listing endpoint.

pub mod client;
pub mod error;
pub mod source;

pub use client::ApiClient;
pub use error::ApiError;
pub use source::PoiSource;

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! External collaborators of the enrichment engine.
//!
//! The engine never talks to a provider directly. Each provider sits
//! behind one of the traits below and is injected by the caller, so
//! tests substitute in-memory stubs and the binary wires up the HTTP
//! clients in [`google`], [`arcgis`], [`px_stat`], [`overpass`] and
//! [`listing_site`]. Endpoints come from the embedded [`registry`].

pub mod arcgis;
pub mod google;
pub mod listing_site;
pub mod overpass;
pub mod px_stat;
pub mod registry;
pub mod retry;

use async_trait::async_trait;
use property_insights_models::{Coordinate, PlaceResult, PriceBand, RawListing, StatisticalCube};

/// Errors returned by external collaborators.
///
/// `Http` and `Json` are the transport-level forms of an unavailable
/// upstream; `UpstreamUnavailable` covers non-success statuses and
/// provider-reported errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned no result for the query.
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up.
        message: String,
    },

    /// The coordinate lies outside every known police division.
    #[error("No police division contains ({lat}, {lng})")]
    NoDivision {
        /// Latitude of the lookup.
        lat: f64,
        /// Longitude of the lookup.
        lng: f64,
    },

    /// The provider answered with a non-success status or an error body.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        /// Service id from the registry.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// The caller's deadline elapsed before the provider answered.
    #[error("{service} timed out after {seconds}s")]
    Timeout {
        /// Service or stage that timed out.
        service: String,
        /// Deadline in seconds.
        seconds: u64,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what is missing.
        message: String,
    },
}

impl SourceError {
    /// Shorthand for [`SourceError::UpstreamUnavailable`].
    #[must_use]
    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

/// Resolves a free-text address to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] if the provider has no result.
    async fn geocode(&self, address: &str) -> Result<Coordinate, SourceError>;
}

/// Finds places near a coordinate.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Searches for places matching `keyword` within `radius_m` meters of
    /// `at`, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the provider cannot be reached.
    async fn search_nearby(
        &self,
        at: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, SourceError>;
}

/// Maps a coordinate to the police division containing it.
#[async_trait]
pub trait DivisionLookup: Send + Sync {
    /// Returns the division name for `at`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoDivision`] if no division contains `at`.
    async fn division_at(&self, at: Coordinate) -> Result<String, SourceError>;
}

/// Fetches a statistical cube by dataset identifier.
#[async_trait]
pub trait CubeFetch: Send + Sync {
    /// Fetches `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure or non-success status.
    async fn fetch_cube(&self, dataset: &str) -> Result<StatisticalCube, SourceError>;
}

/// Searches a listing site for adverts in a location and price band.
#[async_trait]
pub trait ListingSearch: Send + Sync {
    /// Returns raw adverts for the `location` slug within `band`, in
    /// provider order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the site cannot be reached.
    async fn search(&self, location: &str, band: PriceBand)
    -> Result<Vec<RawListing>, SourceError>;
}

/// Counts mapped street lamps around a coordinate.
#[async_trait]
pub trait LightingQuery: Send + Sync {
    /// Returns the number of street lamps within `radius_m` meters of `at`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the provider cannot be reached.
    async fn count_street_lamps(&self, at: Coordinate, radius_m: u32) -> Result<u32, SourceError>;
}

//! The enrichment output record.
//!
//! A [`ListingReport`] is serialized to JSON for downstream consumers.
//! Fields produced by a stage that failed stay `None` (omitted from the
//! JSON) or empty; the failure itself is described in `warnings`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Coordinate, CrimeStats, NearbyStation, PointOfInterest, PriceBand, SimilarListing,
    StreetLighting,
};

/// Composite scores for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    /// Public transport access, nominally 5-10. Not clamped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_score: Option<i32>,
    /// Pedestrian amenity access, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk_score: Option<u8>,
    /// Affordability versus similar listings, 1 (expensive) to 10 (cheap).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rating: Option<u8>,
    /// Overall safety, 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<u8>,
}

/// Places around the listing, grouped by category in search order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOfLife {
    /// Train then bus stations.
    pub public_transport: Vec<PointOfInterest>,
    /// Supermarkets, pharmacies, and similar.
    pub amenities: Vec<PointOfInterest>,
    /// Restaurants, bars, and similar.
    pub entertainment: Vec<PointOfInterest>,
}

/// Price comparison against similar listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAnalysis {
    /// Band used for the similar-listing search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_band: Option<PriceBand>,
    /// Mean price of `similar`; absent when no comparable was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_average_price: Option<f64>,
    /// Up to five comparable listings in provider order.
    pub similar: Vec<SimilarListing>,
}

/// Safety-related findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyInfo {
    /// Police division containing the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    /// Crime figures for the division.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crime_stats: Option<CrimeStats>,
    /// `true` when `crime_stats` is the synthetic estimate used when the
    /// statistics provider's schema could not be read.
    pub crime_stats_estimated: bool,
    /// Police stations near the listing, in provider order.
    pub nearby_stations: Vec<NearbyStation>,
    /// Street lighting density.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_lighting: Option<StreetLighting>,
    /// Factors that raised the safety score.
    pub safety_factors: Vec<String>,
    /// Factors that lowered the safety score.
    pub risk_factors: Vec<String>,
    /// Safety score on a 1-10 scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_rating: Option<u8>,
}

/// Everything derived for one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingReport {
    /// Free-text address as supplied.
    pub address: String,
    /// Listing price text as supplied.
    pub price_text: String,
    /// Geocoded (or supplied) location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    /// Composite scores.
    pub scores: ScoreCard,
    /// Nearby places.
    pub quality_of_life: QualityOfLife,
    /// Price comparison.
    pub value_analysis: ValueAnalysis,
    /// Safety findings.
    pub safety_info: SafetyInfo,
    /// One entry per stage that failed, as `"<stage>: <error>"`.
    pub warnings: Vec<String>,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
}

impl ListingReport {
    /// Creates an empty report for a listing.
    #[must_use]
    pub fn new(address: impl Into<String>, price_text: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            price_text: price_text.into(),
            coordinates: None,
            scores: ScoreCard::default(),
            quality_of_life: QualityOfLife::default(),
            value_analysis: ValueAnalysis::default(),
            safety_info: SafetyInfo::default(),
            warnings: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for listing enrichment.
//!
//! Every stage of the enrichment engine (place scoring, price analysis,
//! crime statistics) reads and writes the types defined here. The
//! [`report`] module holds the JSON output record assembled from them,
//! and [`cube`] holds the JSON-stat–like statistical cube consumed by the
//! crime statistics resolver.

pub mod cube;
pub mod report;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use cube::{Category, Dimension, StatisticalCube};
pub use report::{ListingReport, QualityOfLife, SafetyInfo, ScoreCard, ValueAnalysis};

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Keyword sent to the place search provider.
///
/// The serialized form is the literal keyword the provider receives.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlaceKeyword {
    // ── Transport ───────────────────────────────────────
    /// Rail stations (2 km search radius)
    TrainStation,
    /// Bus stations and stops (1 km search radius)
    BusStation,

    // ── Amenities ───────────────────────────────────────
    /// Supermarkets
    Supermarket,
    /// Pharmacies
    Pharmacy,
    /// Convenience stores
    ConvenienceStore,
    /// Shopping centres
    ShoppingMall,
    /// Banks
    Bank,
    /// Hospitals
    Hospital,
    /// GP surgeries
    Doctor,

    // ── Entertainment ───────────────────────────────────
    /// Restaurants
    Restaurant,
    /// Bars and pubs
    Bar,
    /// Cafes
    Cafe,
    /// Cinemas
    MovieTheater,
    /// Gyms
    Gym,
    /// Parks
    Park,

    // ── Safety ──────────────────────────────────────────
    /// Police stations
    #[serde(rename = "garda station police")]
    #[strum(serialize = "garda station police")]
    GardaStation,
}

impl PlaceKeyword {
    /// Keywords searched for the amenities category, in search order.
    pub const AMENITIES: &[Self] = &[
        Self::Supermarket,
        Self::Pharmacy,
        Self::ConvenienceStore,
        Self::ShoppingMall,
        Self::Bank,
        Self::Hospital,
        Self::Doctor,
    ];

    /// Keywords searched for the entertainment category, in search order.
    pub const ENTERTAINMENT: &[Self] = &[
        Self::Restaurant,
        Self::Bar,
        Self::Cafe,
        Self::MovieTheater,
        Self::Gym,
        Self::Park,
    ];

    /// Search radius in meters used for this keyword.
    #[must_use]
    pub const fn radius_m(self) -> u32 {
        match self {
            Self::BusStation => 1000,
            Self::Supermarket
            | Self::Pharmacy
            | Self::ConvenienceStore
            | Self::ShoppingMall
            | Self::Bank
            | Self::Hospital
            | Self::Doctor => 1500,
            Self::TrainStation
            | Self::Restaurant
            | Self::Bar
            | Self::Cafe
            | Self::MovieTheater
            | Self::Gym
            | Self::Park => 2000,
            Self::GardaStation => 5000,
        }
    }
}

/// One raw result returned by a place search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResult {
    /// Place name as listed by the provider.
    pub name: String,
    /// Location of the place.
    pub coordinate: Coordinate,
    /// Provider category tags, most specific first. May be empty.
    pub category_tags: Vec<String>,
}

/// A place near the listing, with its walking distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    /// Place name.
    pub name: String,
    /// Category, absent when the provider did not classify the place.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Great-circle distance from the listing in kilometers.
    pub distance_km: f64,
    /// Walking time in whole minutes, derived from `distance_km`.
    pub walk_minutes: u32,
}

/// Price range used to bound the similar-listing search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBand {
    /// Lower bound (inclusive), rounded to the nearest 50.
    pub min: f64,
    /// Upper bound (inclusive), rounded to the nearest 50.
    pub max: f64,
}

/// One raw result from the listing search provider.
///
/// Any field may be missing; entries are validated by the price analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    /// Display address.
    pub address: Option<String>,
    /// Unparsed price text (e.g. `"€650 per month"`).
    pub price_text: Option<String>,
    /// Absolute URL of the advert.
    pub url: Option<String>,
}

/// A comparable listing kept for the area average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarListing {
    /// Display address.
    pub address: String,
    /// Parsed price, always greater than zero.
    pub price: f64,
    /// Absolute URL of the advert.
    pub url: String,
}

/// Count of incidents for one crime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeTypeData {
    /// Crime type label (e.g. `"Property Crime"`).
    #[serde(rename = "type")]
    pub crime_type: String,
    /// Number of incidents.
    pub count: i64,
}

impl CrimeTypeData {
    /// Creates a breakdown entry.
    #[must_use]
    pub fn new(crime_type: impl Into<String>, count: i64) -> Self {
        Self {
            crime_type: crime_type.into(),
            count,
        }
    }
}

/// Crime exposure figures for a jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeStats {
    /// Total recorded incidents for the period.
    pub total: i64,
    /// Incidents per resident.
    pub per_capita: f64,
    /// Per-type breakdown. Empty when the source has no type subdivision.
    pub breakdown: Vec<CrimeTypeData>,
}

/// A police station near the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStation {
    /// Station name.
    pub name: String,
    /// Distance from the listing in kilometers.
    pub distance_km: f64,
}

/// Street lighting density around the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetLighting {
    /// Number of mapped street lamps within the query radius.
    pub lamp_count: u32,
    /// Rating from 1 to 10.
    pub rating: u8,
    /// Human-readable summary.
    pub description: String,
}

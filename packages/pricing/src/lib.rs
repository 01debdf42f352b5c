#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing price analysis.
//!
//! Parses listing price text, derives the listing site's location token
//! from the address ([`address`]), searches comparable listings within a
//! ±20% band and rates the listing against their average ([`price`],
//! [`analysis`]).

pub mod address;
pub mod analysis;
pub mod price;

use property_insights_source::SourceError;

pub use address::search_location_slug;
pub use analysis::{ValueAssessment, analyze_value};
pub use price::{
    area_average_price, match_similar, parse_price, price_band, price_rating, round_to_nearest_50,
};

/// Errors from price analysis.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// The listing search failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The listing's own price text has no usable price.
    #[error("No price in '{text}'")]
    MissingPrice {
        /// The price text as supplied.
        text: String,
    },
}

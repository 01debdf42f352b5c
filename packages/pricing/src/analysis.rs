//! Value analysis against similar listings.

use property_insights_models::ValueAnalysis;
use property_insights_source::ListingSearch;

use crate::PricingError;
use crate::address::search_location_slug;
use crate::price::{area_average_price, match_similar, parse_price, price_band, price_rating};

/// Result of comparing a listing against its area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueAssessment {
    /// Band, comparables and their average.
    pub analysis: ValueAnalysis,
    /// Affordability rating, absent without an area average.
    pub price_rating: Option<u8>,
}

/// Searches comparable listings for `address` at around `price_text` and
/// rates the listing's price against them.
///
/// # Errors
///
/// Returns [`PricingError::MissingPrice`] when `price_text` has no price,
/// and [`PricingError::Source`] when the listing search fails.
pub async fn analyze_value(
    listings: &dyn ListingSearch,
    address: &str,
    price_text: &str,
) -> Result<ValueAssessment, PricingError> {
    let current = parse_price(price_text);
    if current <= 0.0 {
        return Err(PricingError::MissingPrice {
            text: price_text.to_string(),
        });
    }

    let band = price_band(current);
    let location = search_location_slug(address);
    log::debug!(
        "Comparing {current} in '{location}' between {} and {}",
        band.min,
        band.max
    );

    let raw = listings.search(&location, band).await?;
    let similar = match_similar(&raw);
    let area_average = area_average_price(&similar);
    let rating = area_average.and_then(|avg| price_rating(current, avg));

    log::info!(
        "{} similar listings found (of {} raw), area average {area_average:?}",
        similar.len(),
        raw.len()
    );

    Ok(ValueAssessment {
        analysis: ValueAnalysis {
            price_band: Some(band),
            area_average_price: area_average,
            similar,
        },
        price_rating: rating,
    })
}

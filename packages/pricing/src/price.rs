//! Price text parsing, bands and ratings.

use std::sync::LazyLock;

use property_insights_models::{PriceBand, RawListing, SimilarListing};
use regex::Regex;

/// Leading decimal number after currency symbols and separators are gone.
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?").expect("valid regex"));

/// Characters removed before the number is read.
const STRIPPED_CHARS: &[char] = &['€', '£', '$', ',', ' ', '\u{a0}'];

/// Most comparables kept for the area average.
pub const MAX_SIMILAR: usize = 5;

/// Extracts the leading numeric value from listing price text.
///
/// `"€1,234 per month"` parses to `1234.0`. Text without a leading
/// number parses to `0.0`.
#[must_use]
pub fn parse_price(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();

    LEADING_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Rounds to the nearest multiple of 50, halves away from zero.
#[must_use]
pub fn round_to_nearest_50(value: f64) -> f64 {
    (value / 50.0).round() * 50.0
}

/// Search band of ±20% around `base`.
#[must_use]
pub fn price_band(base: f64) -> PriceBand {
    PriceBand {
        min: round_to_nearest_50(base * 0.8),
        max: round_to_nearest_50(base * 1.2),
    }
}

fn present(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Keeps the first [`MAX_SIMILAR`] listings with an address, a URL and a
/// positive price, in source order.
#[must_use]
pub fn match_similar(raw: &[RawListing]) -> Vec<SimilarListing> {
    raw.iter()
        .filter_map(|listing| {
            let price = parse_price(listing.price_text.as_deref().unwrap_or_default());
            if price <= 0.0 {
                return None;
            }
            Some(SimilarListing {
                address: present(listing.address.as_deref())?,
                price,
                url: present(listing.url.as_deref())?,
            })
        })
        .take(MAX_SIMILAR)
        .collect()
}

/// Mean price of `similar`, or `None` when there are none.
#[must_use]
pub fn area_average_price(similar: &[SimilarListing]) -> Option<f64> {
    if similar.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = similar.len() as f64;
    Some(similar.iter().map(|s| s.price).sum::<f64>() / count)
}

/// Rates `current` against the area `average` from 1 (more than 20% above)
/// to 10 (at least 20% below).
///
/// Returns `None` when the average is zero.
#[must_use]
pub fn price_rating(current: f64, average: f64) -> Option<u8> {
    if average == 0.0 {
        return None;
    }

    let below_average_pct = (average - current) / average * 100.0;

    let rating = match below_average_pct {
        p if p >= 20.0 => 10,
        p if p >= 15.0 => 9,
        p if p >= 10.0 => 8,
        p if p >= 5.0 => 7,
        p if p >= 0.0 => 6,
        p if p >= -5.0 => 5,
        p if p >= -10.0 => 4,
        p if p >= -15.0 => 3,
        p if p >= -20.0 => 2,
        _ => 1,
    };
    Some(rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(address: Option<&str>, price: Option<&str>, url: Option<&str>) -> RawListing {
        RawListing {
            address: address.map(String::from),
            price_text: price.map(String::from),
            url: url.map(String::from),
        }
    }

    #[test]
    fn parses_currency_and_separators() {
        assert!((parse_price("€1,234") - 1234.0).abs() < f64::EPSILON);
        assert!((parse_price("1,234") - 1234.0).abs() < f64::EPSILON);
        assert!((parse_price("1 234") - 1234.0).abs() < f64::EPSILON);
        assert!((parse_price("1\u{a0}234") - 1234.0).abs() < f64::EPSILON);
        assert!((parse_price("£950.50/month") - 950.5).abs() < f64::EPSILON);
        assert!((parse_price("  $700 weekly") - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_price_is_zero() {
        assert!(parse_price("").abs() < f64::EPSILON);
        assert!(parse_price("Price on application").abs() < f64::EPSILON);
        assert!(parse_price("from €800").abs() < f64::EPSILON);
    }

    #[test]
    fn rounds_to_nearest_50() {
        assert!((round_to_nearest_50(1025.0) - 1050.0).abs() < f64::EPSILON);
        assert!((round_to_nearest_50(1024.0) - 1000.0).abs() < f64::EPSILON);
        assert!((round_to_nearest_50(1075.0) - 1100.0).abs() < f64::EPSILON);
        assert!(round_to_nearest_50(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn band_is_twenty_percent_each_side() {
        assert_eq!(
            price_band(1000.0),
            PriceBand {
                min: 800.0,
                max: 1200.0
            }
        );
        assert_eq!(
            price_band(950.0),
            PriceBand {
                min: 750.0,
                max: 1150.0
            }
        );
    }

    #[test]
    fn rating_boundaries() {
        let cases = [
            (80.0, 10),
            (85.0, 9),
            (90.0, 8),
            (95.0, 7),
            (100.0, 6),
            (105.0, 5),
            (110.0, 4),
            (115.0, 3),
            (120.0, 2),
            (121.0, 1),
        ];
        for (current, expected) in cases {
            assert_eq!(
                price_rating(current, 100.0),
                Some(expected),
                "current {current}"
            );
        }
    }

    #[test]
    fn rating_is_monotonic_in_price() {
        let mut last = 10;
        for current in (0..300).map(f64::from) {
            let rating = price_rating(current, 150.0).unwrap();
            assert!(rating <= last, "rating rose at {current}");
            last = rating;
        }
    }

    #[test]
    fn zero_average_has_no_rating() {
        assert_eq!(price_rating(1000.0, 0.0), None);
    }

    #[test]
    fn similar_filters_and_caps_in_order() {
        let listings = vec![
            raw(Some("A"), Some("€900"), Some("https://x/1")),
            raw(Some("B"), Some("POA"), Some("https://x/2")),
            raw(None, Some("€900"), Some("https://x/3")),
            raw(Some("C"), Some("€1,000"), None),
            raw(Some("  "), Some("€1,000"), Some("https://x/4")),
            raw(Some("D"), Some("1100"), Some("https://x/5")),
            raw(Some("E"), Some("1200"), Some("https://x/6")),
            raw(Some("F"), Some("1300"), Some("https://x/7")),
            raw(Some("G"), Some("1400"), Some("https://x/8")),
            raw(Some("H"), Some("1500"), Some("https://x/9")),
        ];
        let similar = match_similar(&listings);
        let addresses: Vec<&str> = similar.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(addresses, vec!["A", "D", "E", "F", "G"]);
        assert!(similar.iter().all(|s| s.price > 0.0));
    }

    #[test]
    fn average_of_similar() {
        let similar = vec![
            SimilarListing {
                address: "A".to_string(),
                price: 900.0,
                url: "u".to_string(),
            },
            SimilarListing {
                address: "B".to_string(),
                price: 1100.0,
                url: "u".to_string(),
            },
        ];
        assert_eq!(area_average_price(&similar), Some(1000.0));
        assert_eq!(area_average_price(&[]), None);
    }
}

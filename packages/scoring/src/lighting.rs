//! Street lighting rating from a lamp count.

use property_insights_models::{Coordinate, StreetLighting};
use property_insights_source::{LightingQuery, SourceError};

/// Default radius in meters the lamp count covers.
pub const LIGHTING_RADIUS_M: u32 = 500;

/// Rates a lamp count within `radius_m`: more than 50 is 10, more than 20
/// is 8, more than 10 is 6, anything else 4.
#[must_use]
pub fn lighting_from_count(lamp_count: u32, radius_m: u32) -> StreetLighting {
    let rating = match lamp_count {
        n if n > 50 => 10,
        n if n > 20 => 8,
        n if n > 10 => 6,
        _ => 4,
    };

    StreetLighting {
        lamp_count,
        rating,
        description: format!("{lamp_count} street lights within {radius_m}m"),
    }
}

/// Counts street lamps within `radius_m` of `at` and rates them.
///
/// # Errors
///
/// Returns [`SourceError`] if the lamp count cannot be fetched.
pub async fn assess_street_lighting(
    lighting: &dyn LightingQuery,
    at: Coordinate,
    radius_m: u32,
) -> Result<StreetLighting, SourceError> {
    let count = lighting.count_street_lamps(at, radius_m).await?;
    Ok(lighting_from_count(count, radius_m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_thresholds_are_exclusive() {
        assert_eq!(lighting_from_count(0, LIGHTING_RADIUS_M).rating, 4);
        assert_eq!(lighting_from_count(10, LIGHTING_RADIUS_M).rating, 4);
        assert_eq!(lighting_from_count(11, LIGHTING_RADIUS_M).rating, 6);
        assert_eq!(lighting_from_count(20, LIGHTING_RADIUS_M).rating, 6);
        assert_eq!(lighting_from_count(21, LIGHTING_RADIUS_M).rating, 8);
        assert_eq!(lighting_from_count(50, LIGHTING_RADIUS_M).rating, 8);
        assert_eq!(lighting_from_count(51, LIGHTING_RADIUS_M).rating, 10);
    }

    #[test]
    fn description_mentions_count() {
        assert_eq!(
            lighting_from_count(37, LIGHTING_RADIUS_M).description,
            "37 street lights within 500m"
        );
    }
}

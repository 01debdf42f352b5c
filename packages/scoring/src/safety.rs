//! Safety score composition.

use property_insights_models::NearbyStation;

const BASE_SCORE: i32 = 70;
const SAFETY_FACTOR_POINTS: i32 = 5;
const RISK_FACTOR_POINTS: i32 = 10;
const LIGHTING_MULTIPLIER: i32 = 2;

/// Lighting rating at or above which streets count as well lit.
pub const WELL_LIT_RATING: u8 = 7;

/// Incidents per resident above which crime counts as a risk.
pub const HIGH_CRIME_PER_CAPITA: f64 = 0.02;

/// A composed safety score with the factors behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyAssessment {
    /// Score from 1 to 100.
    pub score: u8,
    /// Factors that raised the score.
    pub safety_factors: Vec<String>,
    /// Factors that lowered the score.
    pub risk_factors: Vec<String>,
}

impl SafetyAssessment {
    /// The score on a 1-10 scale.
    #[must_use]
    pub const fn rating(&self) -> u8 {
        self.score / 10
    }
}

/// Composes the safety score.
///
/// Starts at 70, adds 5 per safety factor (a nearby police station,
/// well-lit streets), subtracts 10 per risk factor (per-capita crime
/// above 0.02), adds twice the lighting rating and clamps to 1..=100.
/// The first station in `stations` is reported as the closest.
#[must_use]
pub fn compose_safety(
    stations: &[NearbyStation],
    lighting_rating: u8,
    per_capita: f64,
) -> SafetyAssessment {
    let mut safety_factors = Vec::new();
    if let Some(station) = stations.first() {
        let factor = format!("Garda station within {:.1} km", station.distance_km);
        safety_factors.push(factor);
    }
    if lighting_rating >= WELL_LIT_RATING {
        safety_factors.push("Well-lit streets".to_string());
    }

    let mut risk_factors = Vec::new();
    if per_capita > HIGH_CRIME_PER_CAPITA {
        risk_factors.push("Above average crime rate".to_string());
    }

    let factor_count = |factors: &[String]| i32::try_from(factors.len()).unwrap_or(i32::MAX);
    let score = BASE_SCORE + factor_count(&safety_factors) * SAFETY_FACTOR_POINTS
        - factor_count(&risk_factors) * RISK_FACTOR_POINTS
        + i32::from(lighting_rating) * LIGHTING_MULTIPLIER;

    SafetyAssessment {
        score: u8::try_from(score.clamp(1, 100)).unwrap_or(1),
        safety_factors,
        risk_factors,
    }
}

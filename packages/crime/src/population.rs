//! Approximate resident population per police division.

/// Population assumed for divisions missing from [`DIVISION_POPULATIONS`].
pub const DEFAULT_POPULATION: u32 = 100_000;

/// Dublin Metropolitan Region divisions, keyed by their exact name.
pub const DIVISION_POPULATIONS: &[(&str, u32)] = &[
    ("D.M.R. Northern Division", 180_000),
    ("D.M.R. North Central Division", 300_000),
    ("D.M.R. Southern Division", 200_000),
    ("D.M.R. South Central Division", 280_000),
    ("D.M.R. Eastern Division", 260_000),
    ("D.M.R. Western Division", 220_000),
];

/// Population of `division` (exact name match), or [`DEFAULT_POPULATION`].
#[must_use]
pub fn population(division: &str) -> u32 {
    DIVISION_POPULATIONS
        .iter()
        .find(|(name, _)| *name == division)
        .map_or(DEFAULT_POPULATION, |(_, pop)| *pop)
}

/// Incidents per resident of `division`.
#[must_use]
pub fn per_capita(total: i64, division: &str) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    total / f64::from(population(division))
}

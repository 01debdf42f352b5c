//! Heuristic resolution of crime counts from a statistical cube.
//!
//! The provider does not publish stable dimension keys, so the region and
//! year dimensions are located by label keywords, then by key prefixes,
//! then by position. The region category is matched against the division
//! name after [`normalize`], and the count is read from the row-major
//! value vector at `region_index * year_count + year_index`.

use property_insights_models::{CrimeStats, CrimeTypeData, Dimension, StatisticalCube};

use crate::CrimeStatsError;
use crate::population::per_capita;

/// Dimension labels containing any of these denote the region dimension.
const REGION_LABEL_HINTS: &[&str] = &["garda", "division", "station", "area", "region"];

/// Dimension labels containing any of these denote the year dimension.
const YEAR_LABEL_HINTS: &[&str] = &["year", "time", "period"];

/// Case-sensitive key prefixes of region dimensions.
const REGION_KEY_PREFIXES: &[&str] = &["C0", "STATISTIC", "REGION", "AREA"];

/// Case-sensitive key prefixes of year dimensions. `TLIST` is also
/// matched case-insensitively.
const YEAR_KEY_PREFIXES: &[&str] = &["TIME", "YEAR", "PERIOD"];

/// Substrings removed by [`normalize`], in order.
const STRIPPED_TOKENS: &[&str] = &[".", ",", "-", "–", "—", "(", ")", "division"];

/// Total used when the cube has no dimensions.
pub const FALLBACK_TOTAL: i64 = 500;

/// The region and year dimension keys of a cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionKeys {
    /// Key of the region (division) dimension.
    pub region: String,
    /// Key of the year dimension.
    pub year: String,
}

fn contains_any(label: &str, hints: &[&str]) -> bool {
    hints.iter().any(|hint| label.contains(*hint))
}

fn starts_with_any(key: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| key.starts_with(*prefix))
}

fn is_year_key(key: &str) -> bool {
    key.to_uppercase().starts_with("TLIST") || starts_with_any(key, YEAR_KEY_PREFIXES)
}

/// Locates the region and year dimensions of `cube`.
///
/// Keys are examined in sorted order. A single dimension may be chosen
/// for both roles when its label matches both keyword sets.
///
/// # Errors
///
/// Returns [`CrimeStatsError::SchemaMismatch`] if either key is still
/// unresolved after the positional fallback.
pub fn resolve_dimension_keys(cube: &StatisticalCube) -> Result<DimensionKeys, CrimeStatsError> {
    let mut region: Option<&str> = None;
    let mut year: Option<&str> = None;

    for (key, dimension) in &cube.dimensions {
        let label = dimension.label.to_lowercase();
        if region.is_none() && contains_any(&label, REGION_LABEL_HINTS) {
            region = Some(key.as_str());
        }
        if year.is_none() && contains_any(&label, YEAR_LABEL_HINTS) {
            year = Some(key.as_str());
        }
    }

    if region.is_none() {
        region = cube
            .dimensions
            .keys()
            .find(|key| starts_with_any(key, REGION_KEY_PREFIXES))
            .map(String::as_str);
    }
    if year.is_none() {
        year = cube
            .dimensions
            .keys()
            .find(|key| is_year_key(key))
            .map(String::as_str);
    }

    if region.is_none() || year.is_none() {
        let keys: Vec<&str> = cube.dimensions.keys().map(String::as_str).collect();
        if keys.len() >= 2 {
            log::warn!("Guessing cube dimensions by position from {keys:?}");
            region = region.or(Some(keys[0]));
            year = year.or(Some(keys[1]));
        }
    }

    match (region, year) {
        (Some(region), Some(year)) => Ok(DimensionKeys {
            region: region.to_string(),
            year: year.to_string(),
        }),
        _ => Err(CrimeStatsError::SchemaMismatch {
            region_key: region.unwrap_or_default().to_string(),
            year_key: year.unwrap_or_default().to_string(),
            available: cube.dimension_keys(),
        }),
    }
}

/// Lowercases, strips punctuation, dashes and the word `division`, then
/// collapses double spaces and trims.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut s = name.to_lowercase();
    for token in STRIPPED_TOKENS {
        s = s.replace(*token, "");
    }
    s.replace("  ", " ").trim().to_string()
}

/// Finds the first category (in index order) whose normalized label
/// equals or contains the normalized `division`.
///
/// Returns the category position and its label.
#[must_use]
pub fn match_region<'a>(dimension: &'a Dimension, division: &str) -> Option<(usize, &'a str)> {
    let target = normalize(division);

    dimension
        .category
        .index
        .iter()
        .enumerate()
        .find_map(|(position, code)| {
            let label = dimension.category.label_for(code);
            let normalized = normalize(label);
            (normalized == target || normalized.contains(&target))
                .then_some((position, label))
        })
}

/// Position of the category whose code is exactly `year`.
#[must_use]
pub fn match_year(dimension: &Dimension, year: &str) -> Option<usize> {
    let codes = &dimension.category.index;
    codes.iter().position(|code| code == year)
}

/// Reads the recorded-crime total for `division` in `year` from `cube`.
///
/// Per-capita uses the population of the matched category label. The
/// cube carries no crime-type subdivision, so the breakdown is empty.
///
/// # Errors
///
/// Returns [`CrimeStatsError`] if the dimensions cannot be located, the
/// division or year is absent, or the computed cell lies outside the
/// value vector.
pub fn stats_from_cube(
    cube: &StatisticalCube,
    division: &str,
    year: &str,
) -> Result<CrimeStats, CrimeStatsError> {
    let keys = resolve_dimension_keys(cube)?;
    log::debug!("Cube dimensions {keys:?}");

    let region_dim = &cube.dimensions[&keys.region];
    let year_dim = &cube.dimensions[&keys.year];

    let (region_index, label) =
        match_region(region_dim, division).ok_or_else(|| CrimeStatsError::NoMatch {
            message: format!("division '{division}' not found in cube"),
        })?;

    let year_index = match_year(year_dim, year).ok_or_else(|| CrimeStatsError::NoMatch {
        message: format!("year {year} not available"),
    })?;

    let index = region_index * year_dim.category.index.len() + year_index;
    let value = cube
        .values
        .get(index)
        .copied()
        .ok_or(CrimeStatsError::IndexOutOfRange {
            index,
            len: cube.values.len(),
        })?;

    #[allow(clippy::cast_possible_truncation)]
    let total = value as i64;

    log::info!("{label} recorded {total} incidents in {year}");

    Ok(CrimeStats {
        total,
        per_capita: per_capita(total, label),
        breakdown: Vec::new(),
    })
}

/// Estimated figures used when the cube has no dimensions.
#[must_use]
pub fn fallback_stats(division: &str) -> CrimeStats {
    CrimeStats {
        total: FALLBACK_TOTAL,
        per_capita: per_capita(FALLBACK_TOTAL, division),
        breakdown: vec![
            CrimeTypeData::new("Property Crime", 300),
            CrimeTypeData::new("Violent Crime", 100),
            CrimeTypeData::new("Other Crime", 100),
        ],
    }
}

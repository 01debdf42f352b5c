#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Jurisdiction-level crime exposure for a coordinate.
//!
//! [`CrimeStatsResolver`] maps a coordinate to its police division, fetches
//! the recorded-crime cube and reads the division's total for a year. The
//! cube schema is unstable, so dimension keys are resolved heuristically
//! (see [`resolve`]). A cube with no dimensions at all yields estimated
//! figures instead of an error.

pub mod population;
pub mod resolve;

use std::sync::Arc;

use property_insights_models::{Coordinate, CrimeStats};
use property_insights_source::{CubeFetch, DivisionLookup, SourceError};

/// Errors from crime statistics resolution.
#[derive(Debug, thiserror::Error)]
pub enum CrimeStatsError {
    /// Division lookup or cube fetch failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The region or year dimension could not be identified.
    #[error(
        "Cube dimensions not found (region: '{region_key}', year: '{year_key}'), available: {available:?}"
    )]
    SchemaMismatch {
        /// Region key resolved so far (empty when unresolved).
        region_key: String,
        /// Year key resolved so far (empty when unresolved).
        year_key: String,
        /// All dimension keys of the cube.
        available: Vec<String>,
    },

    /// The division or year is not a category of the cube.
    #[error("{message}")]
    NoMatch {
        /// What was not found.
        message: String,
    },

    /// The computed cell lies outside the value vector.
    #[error("Cube value index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Computed flat index.
        index: usize,
        /// Length of the value vector.
        len: usize,
    },
}

/// Crime figures for the division containing a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeReport {
    /// Division name as returned by the division lookup.
    pub division: String,
    /// Crime figures for the division.
    pub stats: CrimeStats,
    /// `true` when the figures are estimates because the cube had no
    /// dimensions.
    pub fallback: bool,
}

/// Resolves crime statistics over injected division and cube providers.
pub struct CrimeStatsResolver {
    divisions: Arc<dyn DivisionLookup>,
    cubes: Arc<dyn CubeFetch>,
    dataset: String,
}

impl CrimeStatsResolver {
    /// Creates a resolver reading `dataset` from `cubes`.
    #[must_use]
    pub fn new(
        divisions: Arc<dyn DivisionLookup>,
        cubes: Arc<dyn CubeFetch>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            divisions,
            cubes,
            dataset: dataset.into(),
        }
    }

    /// Dataset identifier fetched on every resolution.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Resolves recorded crime for the division containing `at` in `year`.
    ///
    /// # Errors
    ///
    /// Returns [`CrimeStatsError::Source`] when the coordinate lies outside
    /// every division or the cube cannot be fetched, and the other
    /// variants when a non-empty cube cannot be read for the division and
    /// year.
    pub async fn resolve(
        &self,
        at: Coordinate,
        year: &str,
    ) -> Result<CrimeReport, CrimeStatsError> {
        let division = self.divisions.division_at(at).await?;
        let cube = self.cubes.fetch_cube(&self.dataset).await?;

        if cube.is_schemaless() {
            log::warn!(
                "Cube {} has no dimensions, using estimated figures for {division}",
                self.dataset
            );
            return Ok(CrimeReport {
                stats: resolve::fallback_stats(&division),
                division,
                fallback: true,
            });
        }

        let stats = resolve::stats_from_cube(&cube, &division, year)?;
        Ok(CrimeReport {
            division,
            stats,
            fallback: false,
        })
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry for listing enrichment.
//!
//! [`distance`] holds the great-circle and walking-time helpers used by
//! place scoring. [`DivisionIndex`] is an offline [`DivisionLookup`] over
//! police division polygons loaded from a `GeoJSON` `FeatureCollection`,
//! indexed in an R-tree for point-in-polygon lookups.

pub mod distance;

use std::path::Path;

use async_trait::async_trait;
use geo::{BoundingRect, Contains, MultiPolygon};
use geojson::GeoJson;
use property_insights_models::Coordinate;
use property_insights_source::{DivisionLookup, SourceError};
use rstar::{AABB, RTree, RTreeObject};

pub use distance::{distance_km, point_of_interest, walk_minutes};

/// Errors raised while building a [`DivisionIndex`].
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// The boundaries file could not be read.
    #[error("Failed to read boundaries: {0}")]
    Io(#[from] std::io::Error),

    /// The boundaries are not valid `GeoJSON`.
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(Box<geojson::Error>),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

impl From<geojson::Error> for SpatialError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}

/// A division polygon stored in the R-tree.
struct DivisionEntry {
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for DivisionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of police division polygons.
pub struct DivisionIndex {
    divisions: RTree<DivisionEntry>,
}

impl DivisionIndex {
    /// Property holding the division name when none is given.
    pub const DEFAULT_NAME_PROPERTY: &'static str = "Division";

    /// Loads divisions from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, name_property: &str) -> Result<Self, SpatialError> {
        let text = std::fs::read_to_string(path)?;
        let index = Self::from_geojson(&text, name_property)?;
        log::info!(
            "Loaded {} division polygons from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Builds the index from `GeoJSON` `FeatureCollection` text.
    ///
    /// Features without a polygonal geometry or without a string
    /// `name_property` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the text is not a `FeatureCollection`.
    pub fn from_geojson(text: &str, name_property: &str) -> Result<Self, SpatialError> {
        let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let mut entries = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(name) = feature
                .property(name_property)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from)
            else {
                log::warn!("Skipping feature without '{name_property}' property");
                continue;
            };

            let Some(polygon) = feature.geometry.and_then(to_multipolygon) else {
                log::warn!("Skipping division {name}: geometry is not polygonal");
                continue;
            };

            entries.push(DivisionEntry {
                name,
                envelope: compute_envelope(&polygon),
                polygon,
            });
        }

        Ok(Self {
            divisions: RTree::bulk_load(entries),
        })
    }

    /// Number of indexed divisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.divisions.size()
    }

    /// Whether the index holds no divisions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.divisions.size() == 0
    }

    /// Name of the division containing `at`.
    ///
    /// Divisions tile without overlap, so first match wins.
    #[must_use]
    pub fn lookup(&self, at: Coordinate) -> Option<&str> {
        let point = geo::Point::new(at.lng, at.lat);
        let query_env = AABB::from_point([at.lng, at.lat]);

        self.divisions
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.name.as_str())
    }
}

#[async_trait]
impl DivisionLookup for DivisionIndex {
    async fn division_at(&self, at: Coordinate) -> Result<String, SourceError> {
        self.lookup(at)
            .map(String::from)
            .ok_or(SourceError::NoDivision {
                lat: at.lat,
                lng: at.lng,
            })
    }
}

fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    match geo::Geometry::<f64>::try_from(geometry).ok()? {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

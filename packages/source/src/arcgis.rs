//! `ArcGIS` `FeatureServer` division lookup.
//!
//! Sends a point-in-polygon query against the police division layer and
//! reads the division name from the first intersecting feature's
//! attributes. `ArcGIS` reports query errors in an `error` member of an
//! HTTP 200 body.

use async_trait::async_trait;
use property_insights_models::Coordinate;

use crate::registry::ArcGisDivisionsConfig;
use crate::{DivisionLookup, SourceError, retry};

const SERVICE: &str = "arcgis_divisions";

/// [`DivisionLookup`] backed by an `ArcGIS` feature layer.
pub struct ArcGisDivisions {
    client: reqwest::Client,
    config: ArcGisDivisionsConfig,
}

impl ArcGisDivisions {
    /// Creates a lookup against the configured layer.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: ArcGisDivisionsConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl DivisionLookup for ArcGisDivisions {
    async fn division_at(&self, at: Coordinate) -> Result<String, SourceError> {
        // ArcGIS point geometry is "x,y", i.e. longitude first.
        let geometry = format!("{:.6},{:.6}", at.lng, at.lat);

        let body = retry::send_json(SERVICE, || {
            self.client.get(&self.config.query_url).query(&[
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryPoint"),
                ("inSR", "4326"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("outFields", self.config.division_field.as_str()),
                ("returnGeometry", "false"),
                ("f", "json"),
            ])
        })
        .await?;

        let division = parse_division(&body, &self.config.division_field, at)?;
        log::info!("Coordinate falls in division '{division}'");
        Ok(division)
    }
}

/// Extracts the division name from a layer query response.
fn parse_division(
    body: &serde_json::Value,
    field: &str,
    at: Coordinate,
) -> Result<String, SourceError> {
    if body.get("error").is_some() {
        return Err(SourceError::upstream(
            SERVICE,
            format!(
                "ArcGIS API error: {}",
                body["error"]["message"].as_str().unwrap_or("unknown error")
            ),
        ));
    }

    body["features"]
        .as_array()
        .and_then(|features| features.first())
        .and_then(|feature| feature["attributes"][field].as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .ok_or(SourceError::NoDivision {
            lat: at.lat,
            lng: at.lng,
        })
}

//! `OpenStreetMap` Overpass street lamp counter.
//!
//! Posts an `out count;` query for `highway=street_lamp` nodes around a
//! point. The interpreter answers with a single `count` element whose
//! `tags.nodes` holds the number as a string.

use async_trait::async_trait;
use property_insights_models::Coordinate;

use crate::registry::OverpassConfig;
use crate::{LightingQuery, SourceError, retry};

const SERVICE: &str = "overpass";

/// [`LightingQuery`] backed by an Overpass interpreter.
pub struct Overpass {
    client: reqwest::Client,
    config: OverpassConfig,
}

impl Overpass {
    /// Creates an Overpass client.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: OverpassConfig) -> Self {
        Self { client, config }
    }

    /// Radius configured for street lamp queries.
    #[must_use]
    pub const fn radius_m(&self) -> u32 {
        self.config.radius_m
    }
}

#[async_trait]
impl LightingQuery for Overpass {
    async fn count_street_lamps(&self, at: Coordinate, radius_m: u32) -> Result<u32, SourceError> {
        let query = street_lamp_query(at, radius_m);

        let body = retry::send_json(SERVICE, || {
            self.client
                .post(&self.config.interpreter_url)
                .form(&[("data", query.as_str())])
        })
        .await?;

        let count = parse_count(&body)?;
        log::debug!("{count} street lamps within {radius_m}m");
        Ok(count)
    }
}

fn street_lamp_query(at: Coordinate, radius_m: u32) -> String {
    format!(
        "[out:json];node[\"highway\"=\"street_lamp\"](around:{radius_m},{},{});out count;",
        at.lat, at.lng
    )
}

/// Reads the node count from an `out count;` response. No elements
/// means zero lamps.
fn parse_count(body: &serde_json::Value) -> Result<u32, SourceError> {
    let Some(first) = body["elements"].as_array().and_then(|e| e.first()) else {
        return Ok(0);
    };

    let nodes = &first["tags"]["nodes"];
    let parsed = match nodes {
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::Null => Some(0),
        _ => None,
    };

    parsed.ok_or_else(|| {
        let message = format!("unexpected node count {nodes}");
        SourceError::upstream(SERVICE, message)
    })
}

//! JSON-stat–like statistical cube.
//!
//! A cube is a set of named dimensions, each with an ordered list of
//! category codes, plus one flat value vector in row-major order over
//! those dimensions. The crime statistics resolver works against this
//! shape without assuming which dimension keys the provider uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A statistical cube as returned by the cube provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalCube {
    /// Dimension key → dimension metadata.
    #[serde(default, rename = "dimension")]
    pub dimensions: BTreeMap<String, Dimension>,
    /// Flattened cell values. Missing (`null`) cells are stored as `0.0`.
    #[serde(default, rename = "value", deserialize_with = "deserialize_values")]
    pub values: Vec<f64>,
}

/// One cube dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Human-readable dimension label (e.g. `"Garda Division"`).
    #[serde(default)]
    pub label: String,
    /// Category codes and labels.
    #[serde(default)]
    pub category: Category,
}

/// Categories of a dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category codes in cube order.
    #[serde(default, deserialize_with = "deserialize_index")]
    pub index: Vec<String>,
    /// Category code → human-readable label.
    #[serde(default)]
    pub label: BTreeMap<String, String>,
}

impl Category {
    /// Returns the label for `code`, or an empty string when unlabelled.
    #[must_use]
    pub fn label_for(&self, code: &str) -> &str {
        self.label.get(code).map_or("", String::as_str)
    }
}

/// Envelope around the cube in provider responses.
#[derive(Debug, Default, Deserialize)]
struct CubeEnvelope {
    #[serde(default)]
    dataset: StatisticalCube,
}

impl StatisticalCube {
    /// Parses a provider response of the form `{"dataset": {...}}`.
    ///
    /// A response without a `dataset` member parses to an empty cube
    /// (zero dimensions), which downstream code treats as a schema break.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON or a present
    /// `dataset` member has the wrong shape.
    pub fn from_envelope(body: &str) -> Result<Self, serde_json::Error> {
        let envelope: CubeEnvelope = serde_json::from_str(body)?;
        Ok(envelope.dataset)
    }

    /// Returns `true` if the cube has no dimensions.
    #[must_use]
    pub fn is_schemaless(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Dimension keys in enumeration order.
    #[must_use]
    pub fn dimension_keys(&self) -> Vec<String> {
        self.dimensions.keys().cloned().collect()
    }
}

/// JSON-stat allows `category.index` either as an ordered array of codes
/// or as an object mapping each code to its position.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndex {
    Ordered(Vec<String>),
    Positioned(BTreeMap<String, usize>),
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawIndex::deserialize(deserializer)? {
        RawIndex::Ordered(codes) => codes,
        RawIndex::Positioned(positions) => {
            let mut pairs: Vec<(String, usize)> = positions.into_iter().collect();
            pairs.sort_by_key(|(_, pos)| *pos);
            pairs.into_iter().map(|(code, _)| code).collect()
        }
    })
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

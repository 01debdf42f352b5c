//! `PxStat` JSON-stat cube client.
//!
//! Fetches `{url_template}` with `{dataset}` substituted and parses the
//! `{"dataset": {...}}` envelope into a [`StatisticalCube`].

use async_trait::async_trait;
use property_insights_models::StatisticalCube;

use crate::registry::PxStatConfig;
use crate::{CubeFetch, SourceError, retry};

const SERVICE: &str = "px_stat";

/// [`CubeFetch`] backed by the `PxStat` read API.
pub struct PxStatCubes {
    client: reqwest::Client,
    config: PxStatConfig,
}

impl PxStatCubes {
    /// Creates a cube client.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: PxStatConfig) -> Self {
        Self { client, config }
    }

    /// Dataset configured as the default crime cube.
    #[must_use]
    pub fn default_dataset(&self) -> &str {
        &self.config.dataset
    }

    /// Reference year configured for lookups.
    #[must_use]
    pub fn default_year(&self) -> &str {
        &self.config.year
    }
}

/// Expands the `{dataset}` placeholder.
#[allow(clippy::literal_string_with_formatting_args)]
fn dataset_url(template: &str, dataset: &str) -> String {
    template.replace("{dataset}", dataset)
}

#[async_trait]
impl CubeFetch for PxStatCubes {
    async fn fetch_cube(&self, dataset: &str) -> Result<StatisticalCube, SourceError> {
        let url = dataset_url(&self.config.url_template, dataset);
        log::debug!("Fetching cube {dataset} from {url}");

        let text = retry::send_text(SERVICE, || self.client.get(&url)).await?;
        let cube = StatisticalCube::from_envelope(&text)?;

        log::info!(
            "Cube {dataset}: {} dimensions, {} values",
            cube.dimensions.len(),
            cube.values.len()
        );
        Ok(cube)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for listing enrichment.
//!
//! Enriches one listing and prints the report as JSON on stdout. Service
//! endpoints come from the embedded registry; the Google Maps key is read
//! from `GOOGLE_MAPS_API_KEY`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use property_insights_crime::CrimeStatsResolver;
use property_insights_enrich::{
    Collaborators, DEFAULT_STAGE_TIMEOUT, EnrichOptions, Enricher, ListingInput,
};
use property_insights_models::Coordinate;
use property_insights_source::arcgis::ArcGisDivisions;
use property_insights_source::google::GoogleMaps;
use property_insights_source::listing_site::ListingSite;
use property_insights_source::overpass::Overpass;
use property_insights_source::px_stat::PxStatCubes;
use property_insights_source::registry::{ProviderConfig, find_service};
use property_insights_source::{DivisionLookup, SourceError};
use property_insights_spatial::DivisionIndex;

/// Enrich a property listing with location, value and safety insights.
#[derive(Parser)]
#[command(name = "property_insights")]
#[command(about = "Enrich a property listing with location, value and safety insights")]
struct Cli {
    /// Listing address (e.g., "12 Main St, Ranelagh, Co. Dublin").
    #[arg(long)]
    address: String,

    /// Listing price text (e.g., "€1,200 per month").
    #[arg(long)]
    price: String,

    /// Known latitude; skips geocoding when given with `--lng`.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Known longitude.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Year to read from the crime cube (default: the cube service's year).
    #[arg(long)]
    year: Option<String>,

    /// Crime cube dataset id (default: the cube service's dataset).
    #[arg(long)]
    dataset: Option<String>,

    /// Per-stage deadline in seconds.
    #[arg(long, default_value_t = DEFAULT_STAGE_TIMEOUT.as_secs())]
    timeout: u64,

    /// Local `GeoJSON` file of division polygons, used instead of the
    /// `ArcGIS` division service.
    #[arg(long)]
    divisions: Option<PathBuf>,

    /// Feature property holding the division name in `--divisions`.
    #[arg(long, default_value = DivisionIndex::DEFAULT_NAME_PROPERTY)]
    division_property: String,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

fn unexpected_provider(id: &str) -> SourceError {
    SourceError::Config {
        message: format!("Service '{id}' has an unexpected provider type"),
    }
}

fn division_lookup(
    cli: &Cli,
    client: &reqwest::Client,
) -> Result<Arc<dyn DivisionLookup>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.divisions {
        let index = DivisionIndex::load(path, &cli.division_property)?;
        return Ok(Arc::new(index));
    }

    let service = find_service("arcgis_divisions")?;
    let ProviderConfig::ArcgisDivisions(config) = service.provider else {
        return Err(unexpected_provider("arcgis_divisions").into());
    };
    Ok(Arc::new(ArcGisDivisions::new(client.clone(), config)))
}

fn build_enricher(cli: &Cli) -> Result<Enricher, Box<dyn std::error::Error>> {
    let stage_timeout = Duration::from_secs(cli.timeout);
    let client = reqwest::Client::builder().timeout(stage_timeout).build()?;

    let ProviderConfig::GoogleMaps(google) = find_service("google_maps")?.provider else {
        return Err(unexpected_provider("google_maps").into());
    };
    let ProviderConfig::PxStat(px_stat) = find_service("px_stat")?.provider else {
        return Err(unexpected_provider("px_stat").into());
    };
    let ProviderConfig::Overpass(overpass) = find_service("overpass")?.provider else {
        return Err(unexpected_provider("overpass").into());
    };
    let ProviderConfig::ListingSite(listing_site) = find_service("listing_site")?.provider else {
        return Err(unexpected_provider("listing_site").into());
    };

    let google = Arc::new(GoogleMaps::from_env(client.clone(), google)?);
    let cubes = PxStatCubes::new(client.clone(), px_stat);
    let lighting = Overpass::new(client.clone(), overpass);

    let options = EnrichOptions {
        stage_timeout,
        year: cli
            .year
            .clone()
            .unwrap_or_else(|| cubes.default_year().to_string()),
        lighting_radius_m: lighting.radius_m(),
    };
    let dataset = cli
        .dataset
        .clone()
        .unwrap_or_else(|| cubes.default_dataset().to_string());

    let crime = CrimeStatsResolver::new(division_lookup(cli, &client)?, Arc::new(cubes), dataset);

    Ok(Enricher::new(
        Collaborators {
            geocoder: google.clone(),
            places: google,
            listings: Arc::new(ListingSite::new(client, listing_site)),
            lighting: Arc::new(lighting),
            crime,
        },
        options,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let enricher = build_enricher(&cli)?;
    let coordinate = match (cli.lat, cli.lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
        _ => None,
    };
    let input = ListingInput {
        address: cli.address.clone(),
        price_text: cli.price.clone(),
        coordinate,
    };

    let report = enricher.enrich(&input).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn coordinates_must_come_in_pairs() {
        let parsed = Cli::try_parse_from([
            "property_insights",
            "--address",
            "1 Main St, Dublin",
            "--price",
            "€1,000",
            "--lat",
            "53.3",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn negative_longitude_parses() {
        let cli = Cli::try_parse_from([
            "property_insights",
            "--address",
            "1 Main St, Dublin",
            "--price",
            "€1,000",
            "--lat",
            "53.3",
            "--lng",
            "-6.25",
        ])
        .unwrap();
        assert_eq!(cli.lng, Some(-6.25));
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.division_property, "Division");
        assert!(!cli.pretty);
    }
}

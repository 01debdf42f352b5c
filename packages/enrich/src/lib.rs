#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing enrichment engine.
//!
//! [`Enricher`] turns an address and price text into a [`ListingReport`].
//! Stages run one after another, each under its own deadline. A failing
//! stage is logged and recorded in `report.warnings` while the remaining
//! stages carry on; only failing to locate the listing is fatal.

use std::sync::Arc;
use std::time::Duration;

use property_insights_crime::CrimeStatsResolver;
use property_insights_models::{Coordinate, ListingReport};
use property_insights_pricing::analyze_value;
use property_insights_scoring::{
    assess_street_lighting, compose_safety, find_amenities, find_entertainment,
    find_police_stations, find_public_transport, transport_score, walk_score,
};
use property_insights_source::{Geocoder, LightingQuery, ListingSearch, PlaceSearch, SourceError};
use strum_macros::{AsRefStr, Display};

/// Deadline applied to each stage unless configured otherwise.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Fatal enrichment errors.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// The listing address could not be geocoded.
    #[error("Geocoding failed: {0}")]
    Geocode(#[source] SourceError),
}

/// Enrichment stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Address to coordinate.
    Geocode,
    /// Train and bus stations.
    Transport,
    /// Everyday amenities.
    Amenities,
    /// Entertainment venues.
    Entertainment,
    /// Walk score from the place lists.
    WalkScore,
    /// Similar listings and price rating.
    ValueAnalysis,
    /// Nearby police stations.
    PoliceStations,
    /// Street lamp density.
    StreetLighting,
    /// Division crime figures.
    CrimeStatistics,
    /// Safety score from stations, lighting and crime.
    SafetyScore,
}

/// A listing to enrich.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingInput {
    /// Free-text address.
    pub address: String,
    /// Listing price text (e.g. `"€1,200 per month"`).
    pub price_text: String,
    /// Known location; geocoded from `address` when absent.
    pub coordinate: Option<Coordinate>,
}

/// Per-run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Deadline for each stage.
    pub stage_timeout: Duration,
    /// Year looked up in the crime cube.
    pub year: String,
    /// Radius of the street lamp count.
    pub lighting_radius_m: u32,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            year: "2024".to_string(),
            lighting_radius_m: property_insights_scoring::lighting::LIGHTING_RADIUS_M,
        }
    }
}

/// External services the engine depends on.
pub struct Collaborators {
    /// Address geocoder.
    pub geocoder: Arc<dyn Geocoder>,
    /// Nearby place search.
    pub places: Arc<dyn PlaceSearch>,
    /// Similar listing search.
    pub listings: Arc<dyn ListingSearch>,
    /// Street lamp counter.
    pub lighting: Arc<dyn LightingQuery>,
    /// Division crime statistics.
    pub crime: CrimeStatsResolver,
}

/// Runs every enrichment stage for a listing.
pub struct Enricher {
    collaborators: Collaborators,
    options: EnrichOptions,
}

impl Enricher {
    /// Creates an enricher.
    #[must_use]
    pub const fn new(collaborators: Collaborators, options: EnrichOptions) -> Self {
        Self {
            collaborators,
            options,
        }
    }

    /// Awaits `stage` under the stage deadline.
    ///
    /// On failure the error is logged and pushed onto `warnings` as
    /// `"<stage>: <error>"`, and `None` is returned.
    async fn run_stage<T, E, F>(
        &self,
        stage: Stage,
        warnings: &mut Vec<String>,
        fut: F,
    ) -> Option<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let deadline = self.options.stage_timeout;
        let message = match tokio::time::timeout(deadline, fut).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => SourceError::Timeout {
                service: stage.to_string(),
                seconds: deadline.as_secs(),
            }
            .to_string(),
        };

        log::warn!("{stage} failed: {message}");
        warnings.push(format!("{stage}: {message}"));
        None
    }

    async fn locate(&self, input: &ListingInput) -> Result<Coordinate, EnrichError> {
        if let Some(at) = input.coordinate {
            return Ok(at);
        }

        let deadline = self.options.stage_timeout;
        let geocode = self.collaborators.geocoder.geocode(&input.address);
        tokio::time::timeout(deadline, geocode)
            .await
            .unwrap_or_else(|_| {
                Err(SourceError::Timeout {
                    service: Stage::Geocode.to_string(),
                    seconds: deadline.as_secs(),
                })
            })
            .map_err(EnrichError::Geocode)
    }

    /// Enriches `input`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Geocode`] if no coordinate was supplied and
    /// the address cannot be geocoded. Every other failure is reported in
    /// the returned report's `warnings`.
    pub async fn enrich(&self, input: &ListingInput) -> Result<ListingReport, EnrichError> {
        let at = self.locate(input).await?;
        log::info!("Enriching '{}' at {at:?}", input.address);

        let mut report = ListingReport::new(&input.address, &input.price_text);
        report.coordinates = Some(at);
        let mut warnings = Vec::new();

        self.enrich_places(at, &mut report, &mut warnings).await;
        self.enrich_value(input, &mut report, &mut warnings).await;
        self.enrich_safety(at, &mut report, &mut warnings).await;
        compose_safety_score(&mut report, &mut warnings);

        report.warnings = warnings;
        log::info!(
            "Enrichment of '{}' finished with {} warnings",
            input.address,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Transport, amenities and entertainment, then the walk score.
    async fn enrich_places(
        &self,
        at: Coordinate,
        report: &mut ListingReport,
        warnings: &mut Vec<String>,
    ) {
        let places = self.collaborators.places.as_ref();

        let search = find_public_transport(places, at);
        if let Some(stations) = self.run_stage(Stage::Transport, warnings, search).await {
            report.scores.transport_score = Some(transport_score(&stations));
            report.quality_of_life.public_transport = stations;
        }

        for stage in [Stage::Amenities, Stage::Entertainment] {
            let search = async {
                let collection = if stage == Stage::Amenities {
                    find_amenities(places, at).await
                } else {
                    find_entertainment(places, at).await
                };
                Ok::<_, SourceError>(collection)
            };
            let Some(collection) = self.run_stage(stage, warnings, search).await else {
                continue;
            };

            for failure in &collection.failures {
                let message = format!("{stage}: {}: {}", failure.keyword, failure.error);
                warnings.push(message);
            }
            if stage == Stage::Amenities {
                report.quality_of_life.amenities = collection.places;
            } else {
                report.quality_of_life.entertainment = collection.places;
            }
        }

        let walk = walk_score(
            &report.quality_of_life.amenities,
            &report.quality_of_life.entertainment,
            report.scores.transport_score,
        );
        log::debug!("{}: {walk}", Stage::WalkScore);
        report.scores.walk_score = Some(walk);
    }

    async fn enrich_value(
        &self,
        input: &ListingInput,
        report: &mut ListingReport,
        warnings: &mut Vec<String>,
    ) {
        let listings = self.collaborators.listings.as_ref();
        let analysis = analyze_value(listings, &input.address, &input.price_text);

        if let Some(assessment) = self
            .run_stage(Stage::ValueAnalysis, warnings, analysis)
            .await
        {
            report.value_analysis = assessment.analysis;
            report.scores.price_rating = assessment.price_rating;
        }
    }

    /// Police stations, street lighting and crime statistics.
    async fn enrich_safety(
        &self,
        at: Coordinate,
        report: &mut ListingReport,
        warnings: &mut Vec<String>,
    ) {
        let places = self.collaborators.places.as_ref();
        let police = find_police_stations(places, at);
        if let Some(stations) = self
            .run_stage(Stage::PoliceStations, warnings, police)
            .await
        {
            report.safety_info.nearby_stations = stations;
        }

        let lighting = assess_street_lighting(
            self.collaborators.lighting.as_ref(),
            at,
            self.options.lighting_radius_m,
        );
        report.safety_info.street_lighting = self
            .run_stage(Stage::StreetLighting, warnings, lighting)
            .await;

        let crime = self.collaborators.crime.resolve(at, &self.options.year);
        if let Some(crime) = self
            .run_stage(Stage::CrimeStatistics, warnings, crime)
            .await
        {
            report.safety_info.division = Some(crime.division);
            report.safety_info.crime_stats_estimated = crime.fallback;
            report.safety_info.crime_stats = Some(crime.stats);
        }
    }
}

/// Fills the safety score and rating from the gathered safety facts.
///
/// Skipped with a warning when no crime statistics resolved.
fn compose_safety_score(report: &mut ListingReport, warnings: &mut Vec<String>) {
    let safety = &mut report.safety_info;
    let Some(per_capita) = safety.crime_stats.as_ref().map(|s| s.per_capita) else {
        let message = format!("{}: skipped without crime statistics", Stage::SafetyScore);
        log::warn!("{message}");
        warnings.push(message);
        return;
    };

    let lighting_rating = safety.street_lighting.as_ref().map_or(0, |l| l.rating);
    let assessment = compose_safety(&safety.nearby_stations, lighting_rating, per_capita);

    safety.safety_rating = Some(assessment.rating());
    safety.safety_factors = assessment.safety_factors;
    safety.risk_factors = assessment.risk_factors;
    report.scores.safety_score = Some(assessment.score);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use property_insights_models::{
        Category, Dimension, PlaceResult, PriceBand, RawListing, StatisticalCube,
    };
    use property_insights_source::{CubeFetch, DivisionLookup};

    use super::*;

    const AT: Coordinate = Coordinate::new(53.33, -6.25);

    struct StubGeocoder(Option<Coordinate>);

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, address: &str) -> Result<Coordinate, SourceError> {
            self.0.ok_or_else(|| SourceError::NotFound {
                message: address.to_string(),
            })
        }
    }

    /// One place 0.3 km north for every keyword; fails `fail_keyword`.
    struct StubPlaces {
        fail_keyword: Option<&'static str>,
    }

    #[async_trait]
    impl PlaceSearch for StubPlaces {
        async fn search_nearby(
            &self,
            at: Coordinate,
            keyword: &str,
            _radius_m: u32,
        ) -> Result<Vec<PlaceResult>, SourceError> {
            if self.fail_keyword.is_some_and(|k| k == keyword) {
                return Err(SourceError::upstream("google_maps", "OVER_QUERY_LIMIT"));
            }
            Ok(vec![PlaceResult {
                name: format!("{keyword} place"),
                coordinate: Coordinate::new(at.lat + 0.3 / 111.195, at.lng),
                category_tags: vec![keyword.replace(' ', "_")],
            }])
        }
    }

    struct StubListings {
        down: bool,
    }

    #[async_trait]
    impl ListingSearch for StubListings {
        async fn search(
            &self,
            _location: &str,
            _band: PriceBand,
        ) -> Result<Vec<RawListing>, SourceError> {
            if self.down {
                return Err(SourceError::upstream("listing_site", "HTTP 403 Forbidden"));
            }
            Ok(vec![RawListing {
                address: Some("Rathmines, Dublin 6".to_string()),
                price_text: Some("€1,250 per month".to_string()),
                url: Some("https://www.daft.ie/share/rathmines/1".to_string()),
            }])
        }
    }

    struct StubLighting {
        delay: Duration,
    }

    #[async_trait]
    impl LightingQuery for StubLighting {
        async fn count_street_lamps(
            &self,
            _at: Coordinate,
            _radius_m: u32,
        ) -> Result<u32, SourceError> {
            tokio::time::sleep(self.delay).await;
            Ok(60)
        }
    }

    struct StubDivision;

    #[async_trait]
    impl DivisionLookup for StubDivision {
        async fn division_at(&self, _at: Coordinate) -> Result<String, SourceError> {
            Ok("D.M.R. South Central Division".to_string())
        }
    }

    struct StubCube(StatisticalCube);

    #[async_trait]
    impl CubeFetch for StubCube {
        async fn fetch_cube(&self, _dataset: &str) -> Result<StatisticalCube, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn crime_cube() -> StatisticalCube {
        let mut cube = StatisticalCube::default();
        cube.dimensions.insert(
            "C02480V03003".to_string(),
            Dimension {
                label: "Garda Division".to_string(),
                category: Category {
                    index: vec!["1".to_string()],
                    label: BTreeMap::from([(
                        "1".to_string(),
                        "D.M.R. South Central Division".to_string(),
                    )]),
                },
            },
        );
        cube.dimensions.insert(
            "TLIST(A1)".to_string(),
            Dimension {
                label: "Year".to_string(),
                category: Category {
                    index: vec!["2024".to_string()],
                    label: BTreeMap::new(),
                },
            },
        );
        cube.values = vec![7000.0];
        cube
    }

    struct Setup {
        geocoder: Option<Coordinate>,
        fail_keyword: Option<&'static str>,
        listings_down: bool,
        lighting_delay: Duration,
        cube: StatisticalCube,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                geocoder: Some(AT),
                fail_keyword: None,
                listings_down: false,
                lighting_delay: Duration::ZERO,
                cube: crime_cube(),
            }
        }
    }

    impl Setup {
        fn build(self) -> Enricher {
            Enricher::new(
                Collaborators {
                    geocoder: Arc::new(StubGeocoder(self.geocoder)),
                    places: Arc::new(StubPlaces {
                        fail_keyword: self.fail_keyword,
                    }),
                    listings: Arc::new(StubListings {
                        down: self.listings_down,
                    }),
                    lighting: Arc::new(StubLighting {
                        delay: self.lighting_delay,
                    }),
                    crime: CrimeStatsResolver::new(
                        Arc::new(StubDivision),
                        Arc::new(StubCube(self.cube)),
                        "CJA07",
                    ),
                },
                EnrichOptions {
                    stage_timeout: Duration::from_millis(200),
                    ..EnrichOptions::default()
                },
            )
        }
    }

    fn input() -> ListingInput {
        ListingInput {
            address: "12 Main St, Ranelagh, Co. Dublin".to_string(),
            price_text: "€1,000 per month".to_string(),
            coordinate: None,
        }
    }

    #[tokio::test]
    async fn all_stages_complete() {
        let report = Setup::default().build().enrich(&input()).await.unwrap();

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.coordinates, Some(AT));
        assert_eq!(report.quality_of_life.public_transport.len(), 2);
        assert_eq!(report.scores.transport_score, Some(10));
        assert_eq!(report.quality_of_life.amenities.len(), 7);
        assert_eq!(report.quality_of_life.entertainment.len(), 6);
        // 50 + 25 + 25 + 10, clamped
        assert_eq!(report.scores.walk_score, Some(100));
        // (1250 - 1000) / 1250 = 20% below average
        assert_eq!(report.scores.price_rating, Some(10));
        assert_eq!(report.value_analysis.area_average_price, Some(1250.0));

        let safety = &report.safety_info;
        assert_eq!(
            safety.division.as_deref(),
            Some("D.M.R. South Central Division")
        );
        assert!(!safety.crime_stats_estimated);
        assert_eq!(safety.crime_stats.as_ref().map(|c| c.total), Some(7000));
        assert_eq!(safety.street_lighting.as_ref().map(|l| l.rating), Some(10));
        // 7000 / 280000 = 0.025 per capita is a risk:
        // 70 + 2*5 - 10 + 10*2
        assert_eq!(report.scores.safety_score, Some(90));
        assert_eq!(safety.safety_rating, Some(9));
        assert_eq!(safety.risk_factors, vec!["Above average crime rate"]);
    }

    #[tokio::test]
    async fn supplied_coordinate_skips_geocoding() {
        let enricher = Setup {
            geocoder: None,
            ..Setup::default()
        }
        .build();
        let listing = ListingInput {
            coordinate: Some(AT),
            ..input()
        };
        let report = enricher.enrich(&listing).await.unwrap();
        assert_eq!(report.coordinates, Some(AT));
    }

    #[tokio::test]
    async fn geocoding_failure_is_fatal() {
        let enricher = Setup {
            geocoder: None,
            ..Setup::default()
        }
        .build();
        assert!(matches!(
            enricher.enrich(&input()).await,
            Err(EnrichError::Geocode(SourceError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn failing_stage_becomes_warning() {
        let report = Setup {
            listings_down: true,
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("value_analysis: "));
        assert_eq!(report.scores.price_rating, None);
        assert!(report.value_analysis.similar.is_empty());
        assert_eq!(report.scores.transport_score, Some(10));
        assert!(report.scores.safety_score.is_some());
    }

    #[tokio::test]
    async fn failing_keyword_keeps_siblings() {
        let report = Setup {
            fail_keyword: Some("pharmacy"),
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        assert_eq!(report.quality_of_life.amenities.len(), 6);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("amenities: pharmacy: "));
    }

    #[tokio::test]
    async fn transport_failure_leaves_score_empty() {
        let report = Setup {
            fail_keyword: Some("bus_station"),
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        assert_eq!(report.scores.transport_score, None);
        assert!(report.quality_of_life.public_transport.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("transport: "));
        assert!(report.scores.walk_score.is_some());
    }

    #[tokio::test]
    async fn slow_stage_times_out() {
        let report = Setup {
            lighting_delay: Duration::from_secs(5),
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        assert_eq!(report.safety_info.street_lighting, None);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("street_lighting: "));
        assert!(report.warnings[0].contains("timed out"));
        // station only, no lighting bonus: 70 + 5 - 10
        assert_eq!(report.scores.safety_score, Some(65));
    }

    #[tokio::test]
    async fn schemaless_cube_uses_estimate() {
        let report = Setup {
            cube: StatisticalCube::default(),
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        let safety = &report.safety_info;
        assert!(safety.crime_stats_estimated);
        assert_eq!(safety.crime_stats.as_ref().map(|c| c.total), Some(500));
        assert!(safety.risk_factors.is_empty());
    }

    #[tokio::test]
    async fn missing_price_skips_value_analysis() {
        let listing = ListingInput {
            price_text: "Price on application".to_string(),
            ..input()
        };
        let report = Setup::default().build().enrich(&listing).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Price on application"));
        assert!(report.value_analysis.price_band.is_none());
    }

    #[tokio::test]
    async fn unresolved_crime_skips_safety_score() {
        let mut cube = crime_cube();
        cube.values.clear();
        let report = Setup {
            cube,
            ..Setup::default()
        }
        .build()
        .enrich(&input())
        .await
        .unwrap();

        assert_eq!(report.scores.safety_score, None);
        assert_eq!(report.safety_info.crime_stats, None);
        assert!(report.warnings[0].starts_with("crime_statistics: "));
        assert!(report.warnings[1].starts_with("safety_score: "));
        assert!(!report.safety_info.nearby_stations.is_empty());
    }
}

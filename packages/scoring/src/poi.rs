//! Nearby places and the transport and walk scores derived from them.
//!
//! Each keyword is searched once, in a fixed order, and its results are
//! appended in provider order so the output is deterministic.

use property_insights_models::{Coordinate, NearbyStation, PlaceKeyword, PointOfInterest};
use property_insights_source::{PlaceSearch, SourceError};
use property_insights_spatial::{distance_km, point_of_interest};

/// Places within this distance count toward the walk score.
pub const WALKABLE_KM: f64 = 1.0;

/// Points contributed per walkable place.
const POINTS_PER_PLACE: usize = 5;

/// Cap on the points one category contributes to the walk score.
const CATEGORY_CAP: usize = 25;

/// A keyword search that failed while its siblings continued.
#[derive(Debug)]
pub struct KeywordFailure {
    /// Keyword that failed.
    pub keyword: PlaceKeyword,
    /// Why it failed.
    pub error: SourceError,
}

/// Places found for a group of keywords, plus the keywords that failed.
#[derive(Debug, Default)]
pub struct PlaceCollection {
    /// Places in keyword order, then provider order.
    pub places: Vec<PointOfInterest>,
    /// Keywords whose search failed.
    pub failures: Vec<KeywordFailure>,
}

/// Train stations within 2 km followed by bus stations within 1 km.
///
/// The category is the provider's first tag, if any.
///
/// # Errors
///
/// Returns [`SourceError`] if either search fails.
pub async fn find_public_transport(
    places: &dyn PlaceSearch,
    at: Coordinate,
) -> Result<Vec<PointOfInterest>, SourceError> {
    let mut stations = Vec::new();

    for keyword in [PlaceKeyword::TrainStation, PlaceKeyword::BusStation] {
        let found = places
            .search_nearby(at, keyword.as_ref(), keyword.radius_m())
            .await?;
        stations.extend(found.iter().map(|place| {
            point_of_interest(at, place, place.category_tags.first().cloned())
        }));
    }

    log::info!("{} public transport stops found", stations.len());
    Ok(stations)
}

async fn find_by_keywords(
    places: &dyn PlaceSearch,
    at: Coordinate,
    keywords: &[PlaceKeyword],
) -> PlaceCollection {
    let mut collection = PlaceCollection::default();

    for &keyword in keywords {
        match places
            .search_nearby(at, keyword.as_ref(), keyword.radius_m())
            .await
        {
            Ok(found) => {
                let category = keyword.to_string();
                collection.places.extend(
                    found
                        .iter()
                        .map(|place| point_of_interest(at, place, Some(category.clone()))),
                );
            }
            Err(error) => {
                log::warn!("Error searching for {keyword}: {error}");
                collection.failures.push(KeywordFailure { keyword, error });
            }
        }
    }

    collection
}

/// Everyday amenities (supermarkets, pharmacies, banks, ...) within 1.5 km.
pub async fn find_amenities(places: &dyn PlaceSearch, at: Coordinate) -> PlaceCollection {
    let collection = find_by_keywords(places, at, PlaceKeyword::AMENITIES).await;
    log::info!("{} amenities found", collection.places.len());
    collection
}

/// Entertainment venues (restaurants, bars, parks, ...) within 2 km.
pub async fn find_entertainment(places: &dyn PlaceSearch, at: Coordinate) -> PlaceCollection {
    let collection = find_by_keywords(places, at, PlaceKeyword::ENTERTAINMENT).await;
    log::info!("{} entertainment venues found", collection.places.len());
    collection
}

/// Police stations within 5 km, in provider order.
///
/// # Errors
///
/// Returns [`SourceError`] if the search fails.
pub async fn find_police_stations(
    places: &dyn PlaceSearch,
    at: Coordinate,
) -> Result<Vec<NearbyStation>, SourceError> {
    let keyword = PlaceKeyword::GardaStation;
    let found = places
        .search_nearby(at, keyword.as_ref(), keyword.radius_m())
        .await?;

    Ok(found
        .into_iter()
        .map(|place| NearbyStation {
            distance_km: distance_km(at, place.coordinate),
            name: place.name,
        })
        .collect())
}

/// Transport score, nominally 5 to 10.
///
/// The first station counts as the nearest: +3 under 0.5 km, +2 under
/// 1 km. A second option adds 2.
#[must_use]
pub fn transport_score(stations: &[PointOfInterest]) -> i32 {
    let mut score = 5;

    if let Some(nearest) = stations.first() {
        if nearest.distance_km < 0.5 {
            score += 3;
        } else if nearest.distance_km < 1.0 {
            score += 2;
        }
    }
    if stations.len() > 1 {
        score += 2;
    }

    score
}

fn category_points(places: &[PointOfInterest]) -> usize {
    let walkable = places
        .iter()
        .filter(|p| p.distance_km < WALKABLE_KM)
        .count();
    walkable.saturating_mul(POINTS_PER_PLACE).min(CATEGORY_CAP)
}

/// Walk score from 0 to 100.
///
/// Base 50, up to 25 each for amenities and entertainment within 1 km,
/// plus 10 for a transport score of 7 or more (5 for 5 or more). A missing
/// transport score counts as zero.
#[must_use]
pub fn walk_score(
    amenities: &[PointOfInterest],
    entertainment: &[PointOfInterest],
    transport: Option<i32>,
) -> u8 {
    let transport_points = match transport.unwrap_or(0) {
        t if t >= 7 => 10,
        t if t >= 5 => 5,
        _ => 0,
    };

    let score = 50 + category_points(amenities) + category_points(entertainment) + transport_points;
    u8::try_from(score.min(100)).unwrap_or(100)
}

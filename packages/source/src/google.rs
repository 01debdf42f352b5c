//! Google Maps Platform client (Geocoding + Places Nearby Search).
//!
//! - Geocode: `GET {geocode_url}?address=...&region=ie&key=...`
//! - Nearby: `GET {places_url}?location=lat,lng&radius=...&keyword=...&key=...`
//!
//! Both endpoints report errors in a `status` field of an HTTP 200 body,
//! so status handling lives in the response parsers.

use async_trait::async_trait;
use property_insights_models::{Coordinate, PlaceResult};

use crate::registry::GoogleMapsConfig;
use crate::{Geocoder, PlaceSearch, SourceError, retry};

const SERVICE: &str = "google_maps";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Google Maps client implementing [`Geocoder`] and [`PlaceSearch`].
pub struct GoogleMaps {
    client: reqwest::Client,
    config: GoogleMapsConfig,
    api_key: String,
}

impl GoogleMaps {
    /// Creates a client with an explicit API key.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: GoogleMapsConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Creates a client reading the API key from [`API_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the variable is unset or empty.
    pub fn from_env(
        client: reqwest::Client,
        config: GoogleMapsConfig,
    ) -> Result<Self, SourceError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SourceError::Config {
                message: format!("{API_KEY_ENV} not set"),
            })?;
        Ok(Self::new(client, config, api_key))
    }
}

#[async_trait]
impl Geocoder for GoogleMaps {
    async fn geocode(&self, address: &str) -> Result<Coordinate, SourceError> {
        let full_address = with_country_suffix(address, &self.config.country);
        log::debug!("Geocoding '{full_address}'");

        let body = retry::send_json(SERVICE, || {
            self.client.get(&self.config.geocode_url).query(&[
                ("address", full_address.as_str()),
                ("region", self.config.region.as_str()),
                ("key", self.api_key.as_str()),
            ])
        })
        .await?;

        let coordinate = parse_geocode_response(&body, &full_address)?;
        log::info!(
            "Coordinates found: {:.6}, {:.6}",
            coordinate.lat,
            coordinate.lng
        );
        Ok(coordinate)
    }
}

#[async_trait]
impl PlaceSearch for GoogleMaps {
    async fn search_nearby(
        &self,
        at: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, SourceError> {
        let location = format!("{},{}", at.lat, at.lng);
        let radius = radius_m.to_string();

        let body = retry::send_json(SERVICE, || {
            self.client.get(&self.config.places_url).query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword),
                ("language", self.config.language.as_str()),
                ("key", self.api_key.as_str()),
            ])
        })
        .await?;

        let places = parse_nearby_response(&body)?;
        log::debug!("{} '{keyword}' results within {radius_m}m", places.len());
        Ok(places)
    }
}

/// Appends `", {country}"` unless the address already mentions the
/// country (case-insensitive).
#[must_use]
pub fn with_country_suffix(address: &str, country: &str) -> String {
    if country.is_empty() || address.to_lowercase().contains(&country.to_lowercase()) {
        address.to_string()
    } else {
        format!("{address}, {country}")
    }
}

/// Checks the `status` field shared by both endpoints.
///
/// Returns `Ok(false)` for `ZERO_RESULTS`, `Ok(true)` for `OK`.
fn check_status(body: &serde_json::Value) -> Result<bool, SourceError> {
    match body["status"].as_str() {
        Some("OK") => Ok(true),
        Some("ZERO_RESULTS") => Ok(false),
        Some(status) => {
            let detail = body["error_message"].as_str().unwrap_or("no error message");
            let message = format!("{status}: {detail}");
            Err(SourceError::upstream(SERVICE, message))
        }
        None => Err(SourceError::upstream(SERVICE, "response has no status")),
    }
}

fn parse_location(value: &serde_json::Value) -> Option<Coordinate> {
    let location = &value["geometry"]["location"];
    let lat = location["lat"].as_f64()?;
    let lng = location["lng"].as_f64()?;
    Some(Coordinate::new(lat, lng))
}

/// Parses a Geocoding API response, taking the first result.
fn parse_geocode_response(
    body: &serde_json::Value,
    address: &str,
) -> Result<Coordinate, SourceError> {
    let not_found = || SourceError::NotFound {
        message: format!("no geocoding result for '{address}'"),
    };

    if !check_status(body)? {
        return Err(not_found());
    }

    let first = body["results"]
        .as_array()
        .and_then(|results| results.first())
        .ok_or_else(not_found)?;

    parse_location(first)
        .ok_or_else(|| SourceError::upstream(SERVICE, "result has no location"))
}

/// Parses a Places Nearby Search response. Results without a location
/// are skipped.
fn parse_nearby_response(body: &serde_json::Value) -> Result<Vec<PlaceResult>, SourceError> {
    if !check_status(body)? {
        return Ok(Vec::new());
    }

    let results = body["results"].as_array().map_or(&[][..], Vec::as_slice);

    Ok(results
        .iter()
        .filter_map(|result| {
            let coordinate = parse_location(result)?;
            let name = result["name"].as_str().unwrap_or_default().to_string();
            let category_tags = result["types"]
                .as_array()
                .map(|tags| {
                    tags.iter()
                        .filter_map(serde_json::Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            Some(PlaceResult {
                name,
                coordinate,
                category_tags,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_country_when_missing() {
        assert_eq!(
            with_country_suffix("12 Main St, Ranelagh, Co. Dublin", "Ireland"),
            "12 Main St, Ranelagh, Co. Dublin, Ireland"
        );
        assert_eq!(
            with_country_suffix("Ranelagh, Dublin, IRELAND", "Ireland"),
            "Ranelagh, Dublin, IRELAND"
        );
    }

    #[test]
    fn parses_geocode_result() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 53.326, "lng": -6.256}}}]
        });
        let c = parse_geocode_response(&body, "x").unwrap();
        assert!((c.lat - 53.326).abs() < 1e-9);
        assert!((c.lng - -6.256).abs() < 1e-9);
    }

    #[test]
    fn geocode_zero_results_is_not_found() {
        let body = serde_json::json!({"status": "ZERO_RESULTS", "results": []});
        assert!(matches!(
            parse_geocode_response(&body, "nowhere"),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn denied_request_is_upstream_error() {
        let body = serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        });
        let err = parse_nearby_response(&body).unwrap_err();
        assert!(matches!(err, SourceError::UpstreamUnavailable { .. }));
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn parses_nearby_results_with_and_without_types() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "name": "Ranelagh Luas",
                    "geometry": {"location": {"lat": 53.326, "lng": -6.256}},
                    "types": ["train_station", "transit_station"]
                },
                {
                    "name": "Bus stop",
                    "geometry": {"location": {"lat": 53.33, "lng": -6.25}}
                },
                {"name": "No location"}
            ]
        });
        let places = parse_nearby_response(&body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].category_tags[0], "train_station");
        assert!(places[1].category_tags.is_empty());
    }

    #[test]
    fn nearby_zero_results_is_empty() {
        let body = serde_json::json!({"status": "ZERO_RESULTS", "results": []});
        assert!(parse_nearby_response(&body).unwrap().is_empty());
    }
}

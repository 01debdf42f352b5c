//! Compile-time registry of external service configurations.
//!
//! Each provider endpoint is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`find_service`]. Secrets (API keys) are never
//! stored here; they come from the environment.

use serde::Deserialize;

use crate::SourceError;

/// An external service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Unique identifier (e.g., `"google_maps"`, `"px_stat"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Geocoding and Places Nearby Search.
    GoogleMaps(GoogleMapsConfig),
    /// `ArcGIS` `FeatureServer` layer of police division polygons.
    ArcgisDivisions(ArcGisDivisionsConfig),
    /// `PxStat` JSON-stat cube endpoint.
    PxStat(PxStatConfig),
    /// `OpenStreetMap` Overpass interpreter.
    Overpass(OverpassConfig),
    /// Listing site search pages.
    ListingSite(ListingSiteConfig),
}

/// Google Maps Platform endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleMapsConfig {
    /// Geocoding API URL.
    pub geocode_url: String,
    /// Places Nearby Search URL.
    pub places_url: String,
    /// Region bias for geocoding (ccTLD, e.g. `"ie"`).
    pub region: String,
    /// Result language.
    pub language: String,
    /// Country name appended to addresses that do not mention it.
    pub country: String,
}

/// `ArcGIS` division layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ArcGisDivisionsConfig {
    /// Layer query URL (ending in `/query`).
    pub query_url: String,
    /// Attribute holding the division name.
    pub division_field: String,
}

/// `PxStat` cube endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PxStatConfig {
    /// URL with a `{dataset}` placeholder.
    pub url_template: String,
    /// Dataset holding recorded crime by division and year.
    pub dataset: String,
    /// Reference year looked up in the cube.
    pub year: String,
}

/// Overpass interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassConfig {
    /// Interpreter URL.
    pub interpreter_url: String,
    /// Street lamp search radius in meters.
    pub radius_m: u32,
}

/// Listing site search.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingSiteConfig {
    /// Site origin, prefixed to advert paths.
    pub base_url: String,
    /// First path segment of search URLs.
    pub search_path: String,
    /// `User-Agent` sent with search requests.
    pub user_agent: String,
}

const fn default_true() -> bool {
    true
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("google_maps", include_str!("../services/google_maps.toml")),
    (
        "arcgis_divisions",
        include_str!("../services/arcgis_divisions.toml"),
    ),
    ("px_stat", include_str!("../services/px_stat.toml")),
    ("overpass", include_str!("../services/overpass.toml")),
    ("listing_site", include_str!("../services/listing_site.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 5;

/// Returns all service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ServiceConfig> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse service '{name}': {e}"))
        })
        .collect()
}

/// Returns the enabled service with the given id.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if no such service exists or it is
/// disabled.
pub fn find_service(id: &str) -> Result<ServiceConfig, SourceError> {
    let service = all_services()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SourceError::Config {
            message: format!("Unknown service '{id}'"),
        })?;

    if !service.enabled {
        return Err(SourceError::Config {
            message: format!("Service '{id}' is disabled"),
        });
    }

    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn embedded_names_match_ids() {
        for ((name, _), svc) in SERVICE_TOMLS.iter().zip(all_services()) {
            assert_eq!(*name, svc.id);
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
        }
    }

    #[test]
    fn provider_variants_match_ids() {
        for svc in all_services() {
            let ok = match &svc.provider {
                ProviderConfig::GoogleMaps(_) => svc.id == "google_maps",
                ProviderConfig::ArcgisDivisions(c) => {
                    svc.id == "arcgis_divisions" && c.query_url.ends_with("/query")
                }
                ProviderConfig::PxStat(c) => {
                    svc.id == "px_stat" && c.url_template.contains("{dataset}")
                }
                ProviderConfig::Overpass(c) => svc.id == "overpass" && c.radius_m > 0,
                ProviderConfig::ListingSite(_) => svc.id == "listing_site",
            };
            assert!(ok, "Service {} has an unexpected provider config", svc.id);
        }
    }

    #[test]
    fn find_service_rejects_unknown() {
        assert!(find_service("px_stat").is_ok());
        let err = find_service("nope").unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }
}

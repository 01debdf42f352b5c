#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scores derived from the surroundings of a listing.
//!
//! [`poi`] collects nearby places and scores public transport and
//! walkability, [`lighting`] rates street lamp density and [`safety`]
//! combines police presence, lighting and crime into a safety score.

pub mod lighting;
pub mod poi;
pub mod safety;

pub use lighting::{assess_street_lighting, lighting_from_count};
pub use poi::{
    KeywordFailure, PlaceCollection, find_amenities, find_entertainment, find_police_stations,
    find_public_transport, transport_score, walk_score,
};
pub use safety::{SafetyAssessment, compose_safety};

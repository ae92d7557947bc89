//! Domain model and pure matching logic for the foodcart order-matching engine.
//!
//! The crate holds everything that does not touch the network or the
//! database: coordinates and cached places, the [`GeocodeCache`] storage seam,
//! coverage matching, distance ranking, collaborator snapshots, and
//! environment configuration.

mod app_config;
mod cache;
mod config;
mod coverage;
mod distance;
mod matching;
mod places;
mod snapshot;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cache::{GeocodeCache, MemoryGeocodeCache};
pub use config::{load_app_config, load_app_config_from_env};
pub use coverage::{distinct_products, matching_restaurants};
pub use distance::{
    geodesic_km, rank_candidates, Candidate, RankedCandidate, ORDER_ADDRESS_NOT_RECOGNIZED,
    RESTAURANT_ADDRESS_NOT_RECOGNIZED,
};
pub use matching::{addresses_to_resolve, match_orders, MatchResult, OrderMatches};
pub use places::{GeoPoint, PlaceRecord};
pub use snapshot::{
    load_snapshot, parse_snapshot, MenuAvailabilityRecord, OrderRequirement, Restaurant, Snapshot,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read snapshot file {path}: {source}")]
    SnapshotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot file: {0}")]
    SnapshotParse(#[from] serde_yaml::Error),

    #[error("snapshot validation failed: {0}")]
    Validation(String),
}

//! Geocoding provider client and the address resolver that fills the
//! geocode cache.

mod client;
mod error;
mod normalize;
mod resolver;
mod types;

pub use client::GeocoderClient;
pub use error::GeocoderError;
pub use normalize::parse_position;
pub use resolver::{AddressResolver, ResolveSummary, DEFAULT_FLUSH_BATCH_SIZE};
pub use types::{
    FeatureMember, GeoObject, GeoObjectCollection, GeocodeResponse, Point, ResponseBody,
};

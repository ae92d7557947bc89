//! Database operations for the `places` table, the durable geocode cache.

mod cache;
mod read;
mod types;
mod write;

pub use cache::PgGeocodeCache;
pub use read::{get_place, list_places, list_places_by_address};
pub use types::PlaceRow;
pub use write::upsert_places;

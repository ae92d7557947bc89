//! Row types for the `places` table.

use chrono::{DateTime, Utc};
use foodcart_core::{GeoPoint, PlaceRecord};
use rust_decimal::Decimal;

/// A row from the `places` table.
///
/// Both coordinates are `NULL` when the provider did not recognize the address.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    pub id: i64,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub resolved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceRow {
    #[must_use]
    pub fn coordinate(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> PlaceRecord {
        PlaceRecord {
            coordinate: self.coordinate(),
            address: self.address,
            resolved_at: self.resolved_at,
        }
    }
}

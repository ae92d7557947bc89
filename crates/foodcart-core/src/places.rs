use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits kept for latitude and longitude.
pub(crate) const COORDINATE_SCALE: u32 = 3;

/// A resolved coordinate, stored as fixed-precision decimals.
///
/// Both components are rounded to three fractional digits on
/// construction, matching the `NUMERIC(6,3)` columns of the `places` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude: latitude.round_dp(COORDINATE_SCALE),
            longitude: longitude.round_dp(COORDINATE_SCALE),
        }
    }

    /// Returns `true` when latitude is within ±90 and longitude within ±180.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let lat_bound = Decimal::from(90);
        let lon_bound = Decimal::from(180);
        self.latitude.abs() <= lat_bound && self.longitude.abs() <= lon_bound
    }

    /// Converts to a `geo` point (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn to_point(&self) -> geo::Point<f64> {
        geo::Point::new(
            self.longitude.to_f64().unwrap_or_default(),
            self.latitude.to_f64().unwrap_or_default(),
        )
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A cached geocoding outcome for one address.
///
/// `coordinate` is `None` when the provider returned no result; such records
/// are kept so the address is never queried again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub address: String,
    pub coordinate: Option<GeoPoint>,
    pub resolved_at: DateTime<Utc>,
}

impl PlaceRecord {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinate.is_some()
    }
}

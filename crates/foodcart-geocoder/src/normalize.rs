//! Conversion of provider position strings into [`GeoPoint`]s.

use std::str::FromStr;

use foodcart_core::GeoPoint;
use rust_decimal::Decimal;

use crate::error::GeocoderError;

/// Parses a provider position string `"<lon> <lat>"` into a [`GeoPoint`].
///
/// The first token is the **longitude** and the second the **latitude**.
/// Both are rounded to three fractional digits.
///
/// # Errors
///
/// Returns [`GeocoderError::MalformedPosition`] if the string does not hold
/// exactly two decimal tokens or the coordinate is out of range.
pub fn parse_position(address: &str, position: &str) -> Result<GeoPoint, GeocoderError> {
    let malformed = || GeocoderError::MalformedPosition {
        address: address.to_owned(),
        position: position.to_owned(),
    };

    let mut tokens = position.split_whitespace();
    let (Some(lon), Some(lat), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let longitude = Decimal::from_str(lon).map_err(|_| malformed())?;
    let latitude = Decimal::from_str(lat).map_err(|_| malformed())?;

    let point = GeoPoint::new(latitude, longitude);
    if !point.is_valid() {
        return Err(malformed());
    }
    Ok(point)
}

//! Geocoder API response types.
//!
//! Only the fields needed to extract the most relevant position are modelled;
//! everything else in the provider payload is ignored.

use serde::Deserialize;

/// Top-level envelope: `{ "response": { "GeoObjectCollection": { ... } } }`.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub response: ResponseBody,
}

#[derive(Debug, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "GeoObjectCollection")]
    pub geo_object_collection: GeoObjectCollection,
}

/// Search results, ordered by relevance.
#[derive(Debug, Deserialize)]
pub struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    pub feature_member: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureMember {
    #[serde(rename = "GeoObject")]
    pub geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
pub struct GeoObject {
    #[serde(rename = "Point")]
    pub point: Point,
}

/// A position string of the form `"<lon> <lat>"`.
#[derive(Debug, Deserialize)]
pub struct Point {
    pub pos: String,
}

impl GeocodeResponse {
    /// Position string of the first (most relevant) result, if any.
    #[must_use]
    pub fn first_position(&self) -> Option<&str> {
        self.response
            .geo_object_collection
            .feature_member
            .first()
            .map(|m| m.geo_object.point.pos.as_str())
    }
}

//! HTTP client for the geocoding provider.
//!
//! Wraps `reqwest` with API key management, a bounded request timeout, and
//! typed response deserialization. Only the first (most relevant) result of
//! each query is used.

use std::time::Duration;

use foodcart_core::GeoPoint;
use reqwest::{Client, Url};

use crate::error::GeocoderError;
use crate::normalize::parse_position;
use crate::types::GeocodeResponse;

const DEFAULT_BASE_URL: &str = "https://geocode-maps.yandex.ru/1.x";
const DEFAULT_USER_AGENT: &str = "foodcart/0.1 (order-matching)";

/// Client for the geocoding REST API.
///
/// Use [`GeocoderClient::new`] for production or
/// [`GeocoderClient::with_base_url`] to point at a mock server in tests.
pub struct GeocoderClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GeocoderClient {
    /// Creates a new client pointed at the production geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeocoderError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom endpoint and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocoderError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeocoderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| GeocoderError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves `address` to the coordinate of the most relevant result.
    ///
    /// Returns `Ok(None)` when the provider knows no place for the address.
    ///
    /// # Errors
    ///
    /// - [`GeocoderError::Http`] on network failure, timeout, or non-2xx status.
    /// - [`GeocoderError::Deserialize`] if the body does not match the
    ///   expected shape.
    /// - [`GeocoderError::MalformedPosition`] if the first result's position
    ///   cannot be parsed.
    pub async fn fetch_coordinates(&self, address: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        let url = self.build_url(address);
        let body = self.request_json(&url).await?;

        let parsed: GeocodeResponse =
            serde_json::from_value(body).map_err(|e| GeocoderError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        parsed
            .first_position()
            .map(|position| parse_position(address, position))
            .transpose()
    }

    /// Builds the request URL with percent-encoded `geocode`, `apikey`, and
    /// `format` query parameters.
    fn build_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("geocode", address)
            .append_pair("apikey", &self.api_key)
            .append_pair("format", "json");
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body
    /// as JSON.
    ///
    /// Transport errors are stripped of their URL since it carries the API key.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GeocoderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| GeocoderError::Deserialize {
            context: redacted(url),
            source: e,
        })
    }

}

/// Renders `url` with the `apikey` query value replaced, for error messages
/// and logs.
fn redacted(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "apikey" {
                "REDACTED".to_owned()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut clean = url.clone();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

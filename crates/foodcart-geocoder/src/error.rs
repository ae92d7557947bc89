use thiserror::Error;

/// Errors returned by the geocoding client and the address resolver.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// Network failure, timeout, or non-2xx status from the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned a position string that is not `"<lon> <lat>"`.
    #[error("malformed position '{position}' for address '{address}'")]
    MalformedPosition { address: String, position: String },

    /// The caller's deadline passed before every address was resolved.
    #[error("geocoding deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid geocoder base URL: {0}")]
    InvalidBaseUrl(String),

    /// Reading from or writing to the geocode cache failed.
    #[error("geocode cache error: {0}")]
    Cache(#[source] Box<dyn std::error::Error + Send + Sync>),
}

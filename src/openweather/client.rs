//! Blocking OpenWeatherMap HTTP client.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::{AirQualityReading, Coordinates, PollutionResponse};

const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors that can occur when calling the air-quality service.
#[derive(Debug, Error)]
pub enum AirQualityError {
    /// Network-related errors (connection failures, timeouts, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The service answered 2xx with a body we could not read
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Geocoding and air-pollution lookups.
///
/// "Not found" outcomes (no match, non-2xx status) are `Ok(None)`; transport and
/// decoding failures are errors. Each call is a single attempt.
pub trait AirQualityClient: Send + Sync {
    /// Resolves a city name to the coordinates of its first match.
    fn geocode(&self, city: &str) -> Result<Option<Coordinates>, AirQualityError>;

    /// Fetches the current air-quality reading at `coords`.
    fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQualityReading>, AirQualityError>;
}

/// Builder for constructing `OpenWeatherClient` instances.
#[derive(Debug, Default)]
pub struct OpenWeatherClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl OpenWeatherClientBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key sent as the `appid` parameter.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the service base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client.
    ///
    /// If `api_key()` was not called, the `OPENWEATHERMAP_API_KEY` environment variable
    /// is used; a missing key is allowed but every lookup will be rejected upstream.
    pub fn build(self) -> Result<OpenWeatherClient, AirQualityError> {
        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var("OPENWEATHERMAP_API_KEY").unwrap_or_default(),
        };
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| AirQualityError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(AirQualityError::Network)?;

        Ok(OpenWeatherClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// OpenWeatherMap client for the geocoding and air-pollution endpoints.
pub struct OpenWeatherClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true when an API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Issues a GET and returns the body, or `None` on a non-2xx status.
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, AirQualityError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .map_err(AirQualityError::Network)?;

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "air-quality service returned an error status");
            return Ok(None);
        }

        response.text().map(Some).map_err(AirQualityError::Network)
    }
}

impl AirQualityClient for OpenWeatherClient {
    fn geocode(&self, city: &str) -> Result<Option<Coordinates>, AirQualityError> {
        let Some(body) = self.get(
            "/geo/1.0/direct",
            &[("q", city.to_string()), ("limit", "1".to_string())],
        )?
        else {
            return Ok(None);
        };

        let places = decode_geocoding(&body)?;
        debug!(city, found = places.is_some(), "geocoded city");
        Ok(places)
    }

    fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQualityReading>, AirQualityError> {
        let Some(body) = self.get(
            "/data/2.5/air_pollution",
            &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
        )?
        else {
            return Ok(None);
        };

        decode_pollution(&body)
    }
}

/// Decodes a geocoding array, taking the first match.
fn decode_geocoding(body: &str) -> Result<Option<Coordinates>, AirQualityError> {
    let places: Vec<Coordinates> = serde_json::from_str(body).map_err(AirQualityError::Decode)?;
    Ok(places.into_iter().next())
}

/// Decodes an air-pollution body, taking the first list entry.
fn decode_pollution(body: &str) -> Result<Option<AirQualityReading>, AirQualityError> {
    let response: PollutionResponse =
        serde_json::from_str(body).map_err(AirQualityError::Decode)?;
    Ok(response.into_reading())
}

//! Geocoding HTTP adapter.
//!
//! Resolves free-text place queries to the provider's first candidate
//! coordinate. Same wire family as the directions adapter:
//! `GET {base}/maps/api/geocode/json?address=&key=`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::geo::LatLng;
use crate::traits::{GeocodeError, Geocoder};

#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl GeocodeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: api_key.into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    config: GeocodeConfig,
    client: reqwest::Client,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn resolve(&self, query: &str) -> Result<LatLng, GeocodeError> {
        let url = format!("{}/maps/api/geocode/json", self.config.base_url);

        debug!(%query, "geocoding place query");

        let response = self
            .client
            .get(url)
            .query(&[("address", query), ("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|err| GeocodeError::Provider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Provider(format!("HTTP {}", status.as_u16())));
        }

        let parsed: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| GeocodeError::Provider(err.to_string()))?;

        first_candidate(parsed)
    }
}

/// Takes the provider's top-ranked candidate; zero candidates (explicit
/// ZERO_RESULTS or an empty list) means the place does not resolve.
fn first_candidate(response: GeocodeResponse) -> Result<LatLng, GeocodeError> {
    if response.status == "ZERO_RESULTS" {
        return Err(GeocodeError::NotFound);
    }
    if response.status != "OK" {
        return Err(GeocodeError::Provider(response.status));
    }

    response
        .results
        .into_iter()
        .next()
        .map(|result| result.geometry.location)
        .ok_or(GeocodeError::NotFound)
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    geometry: WireGeometry,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: LatLng,
}

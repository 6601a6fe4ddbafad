//! Directions HTTP adapter for walking routes.
//!
//! Speaks the Google-style directions wire format: a GET with
//! `origin`/`destination`/`mode`/`key` query parameters and a JSON body
//! carrying `status`, `routes[].overview_polyline.points` and
//! `routes[].legs[]`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::traits::{RouteError, RouteLeg, RouteProvider, RouteQuery, RouteResult};

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: api_key.into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RouteProvider for DirectionsClient {
    async fn fetch_route(&self, query: &RouteQuery) -> Result<RouteResult, RouteError> {
        // 6 decimals ~= 11cm, stable across repeated calls.
        let origin = format!("{:.6},{:.6}", query.origin.lat, query.origin.lng);
        let destination = format!("{:.6},{:.6}", query.destination.lat, query.destination.lng);
        let url = format!("{}/maps/api/directions/json", self.config.base_url);

        debug!(%origin, %destination, mode = query.mode.as_str(), "fetching route");

        let response = self
            .client
            .get(url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", query.mode.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| RouteError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| RouteError::Network(err.to_string()))?;
        if body.is_empty() {
            return Err(RouteError::Http {
                status: status.as_u16(),
            });
        }

        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|err| RouteError::Network(err.to_string()))?;

        route_from_response(parsed)
    }
}

/// Business-level validation: only a `status == "OK"` response with at
/// least one route holding at least one leg is usable. Only `routes[0]`
/// is consulted.
fn route_from_response(response: DirectionsResponse) -> Result<RouteResult, RouteError> {
    if response.status != "OK" {
        return Err(RouteError::NoRoute {
            status: response.status,
            message: response.error_message,
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::NoRoute {
            status: "OK".to_string(),
            message: Some("response contained no routes".to_string()),
        })?;

    if route.legs.is_empty() {
        return Err(RouteError::NoRoute {
            status: "OK".to_string(),
            message: Some("route contained no legs".to_string()),
        });
    }

    let legs = route
        .legs
        .into_iter()
        .map(|leg| RouteLeg {
            distance_text: leg.distance.text,
            distance_meters: leg.distance.value,
            duration_text: leg.duration.text,
            duration_secs: leg.duration.value,
            start_address: leg.start_address,
            end_address: leg.end_address,
        })
        .collect();

    Ok(RouteResult {
        polyline: route.overview_polyline.points,
        legs,
    })
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    overview_polyline: WirePolyline,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WirePolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    distance: WireTextValue,
    duration: WireTextValue,
    #[serde(default)]
    start_address: Option<String>,
    #[serde(default)]
    end_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTextValue {
    text: String,
    value: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> DirectionsResponse {
        serde_json::from_str(json).expect("fixture should parse")
    }

    #[test]
    fn test_ok_response_yields_route() {
        let response = parse(
            r#"{
                "status": "OK",
                "routes": [{
                    "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                    "legs": [{
                        "distance": { "text": "1.2 km", "value": 1200 },
                        "duration": { "text": "15 mins", "value": 900 },
                        "start_address": "Somewhere 1",
                        "end_address": "Somewhere 2"
                    }]
                }]
            }"#,
        );

        let route = route_from_response(response).unwrap();
        assert_eq!(route.polyline, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
        assert_eq!(route.legs.len(), 1);
        assert_eq!(route.legs[0].distance_text, "1.2 km");
        assert_eq!(route.legs[0].distance_meters, 1200);
        assert_eq!(route.legs[0].duration_text, "15 mins");
        assert_eq!(route.legs[0].duration_secs, 900);
        assert_eq!(route.legs[0].end_address.as_deref(), Some("Somewhere 2"));
    }

    #[test]
    fn test_zero_results_is_no_route() {
        let response = parse(r#"{ "status": "ZERO_RESULTS", "routes": [] }"#);

        match route_from_response(response) {
            Err(RouteError::NoRoute { status, .. }) => assert_eq!(status, "ZERO_RESULTS"),
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_is_carried() {
        let response = parse(
            r#"{ "status": "REQUEST_DENIED", "error_message": "key expired", "routes": [] }"#,
        );

        match route_from_response(response) {
            Err(RouteError::NoRoute { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message.as_deref(), Some("key expired"));
            }
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn test_ok_without_routes_is_no_route() {
        let response = parse(r#"{ "status": "OK", "routes": [] }"#);
        assert!(matches!(
            route_from_response(response),
            Err(RouteError::NoRoute { .. })
        ));
    }

    #[test]
    fn test_ok_without_legs_is_no_route() {
        let response = parse(
            r#"{
                "status": "OK",
                "routes": [{ "overview_polyline": { "points": "abc" }, "legs": [] }]
            }"#,
        );
        assert!(matches!(
            route_from_response(response),
            Err(RouteError::NoRoute { .. })
        ));
    }
}

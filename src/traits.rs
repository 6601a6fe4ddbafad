//! Core seam traits for the navigation engine.
//!
//! These are intentionally minimal: each trait covers one external service
//! the engine orchestrates. Concrete adapters live in sibling modules, and
//! tests substitute in-process fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::geo::LatLng;
use crate::home::HomeLocation;

/// Travel mode requested from the directions provider.
///
/// The engine only ever asks for walking routes; the wire string lives
/// here so adapters never spell it by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Walking,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
        }
    }
}

/// One route request: origin, destination, travel mode.
///
/// Built per intent and discarded after the fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub origin: LatLng,
    pub destination: LatLng,
    pub mode: TravelMode,
}

impl RouteQuery {
    pub fn walking(origin: LatLng, destination: LatLng) -> Self {
        Self {
            origin,
            destination,
            mode: TravelMode::Walking,
        }
    }
}

/// One origin-to-destination segment of a fetched route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub distance_text: String,
    pub distance_meters: i32,
    pub duration_text: String,
    pub duration_secs: i32,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
}

/// A validated route fetch outcome.
///
/// Providers only return this after checking business-level success, so
/// `legs` always holds at least one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Encoded overview polyline for the whole route.
    pub polyline: String,
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission not granted")]
    PermissionDenied,
    #[error("no location fix available")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The provider returned zero candidates for the query.
    #[error("no match for the searched place")]
    NotFound,
    #[error("geocoding provider failed: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Business-level failure: the provider answered but produced no
    /// usable route (non-OK status, or a response without route/leg).
    #[error("directions provider returned {status}")]
    NoRoute {
        status: String,
        message: Option<String>,
    },
    /// Transport-level failure: non-2xx response or empty body.
    #[error("directions provider returned HTTP {status}")]
    Http { status: u16 },
    /// Anything thrown on the way: DNS, timeout, read, deserialization.
    #[error("network failure: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist home location: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode home location: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Best-effort device position source.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Returns the most recent fix known to the platform. Never blocks
    /// waiting for a fresh fix; immediately after install, before any fix
    /// exists, this legitimately fails with `Unavailable`.
    async fn last_known(&self) -> Result<LatLng, LocationError>;
}

/// Resolves free-text place queries to a single best-match coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Takes the first candidate the provider ranks highest; ambiguous
    /// queries resolve to whatever that is. No caching.
    async fn resolve(&self, query: &str) -> Result<LatLng, GeocodeError>;
}

/// Fetches a route between two coordinates from a directions service.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn fetch_route(&self, query: &RouteQuery) -> Result<RouteResult, RouteError>;
}

/// Persisted "home" record. Read/write only, no validation at this layer.
pub trait HomeStore: Send + Sync {
    /// Overwrites the stored record wholesale.
    fn save(&self, home: &HomeLocation) -> Result<(), StoreError>;

    /// `None` means never saved; presence is explicit, a coordinate of
    /// (0, 0) is a real location.
    fn load(&self) -> Option<HomeLocation>;
}

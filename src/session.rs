//! Published navigation session state and user-facing failure kinds.

use thiserror::Error;

use crate::geo::LatLng;
use crate::polyline::Polyline;
use crate::traits::{GeocodeError, LocationError, RouteError};

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    /// Nothing in progress, nothing displayed.
    Idle,
    /// An intent is acquiring location / destination / route.
    Loading,
    /// A route is displayed and navigation is on.
    Active,
}

/// The engine's working state, published for the UI to observe.
///
/// Invariants: `Active` implies a non-empty `route_points` and a set
/// `destination`; `Idle` implies everything cleared. Readers never
/// mutate this, the engine is the single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSession {
    pub mode: NavMode,
    pub route_points: Polyline,
    pub display_distance: String,
    pub display_duration: String,
    pub destination: Option<LatLng>,
}

impl NavigationSession {
    pub fn idle() -> Self {
        Self {
            mode: NavMode::Idle,
            route_points: Polyline::empty(),
            display_distance: String::new(),
            display_duration: String::new(),
            destination: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.mode == NavMode::Active
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::idle();
    }
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::idle()
    }
}

/// Short user-facing failure notices, surfaced as transient events.
///
/// None of these are fatal: every one resets the session to Idle and
/// leaves retrying to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("location permission not granted")]
    PermissionDenied,
    #[error("couldn't get your current location")]
    LocationUnavailable,
    #[error("couldn't find that place")]
    AddressNotFound,
    #[error("set a home address first")]
    HomeNotSet,
    #[error("there's no way to walk to the address")]
    NoRouteFound,
    #[error("route service error (HTTP {0})")]
    ProviderHttp(u16),
    #[error("network error: {0}")]
    Network(String),
}

impl From<LocationError> for NavError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => NavError::PermissionDenied,
            LocationError::Unavailable => NavError::LocationUnavailable,
        }
    }
}

impl From<GeocodeError> for NavError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound => NavError::AddressNotFound,
            GeocodeError::Provider(message) => NavError::Network(message),
        }
    }
}

impl From<RouteError> for NavError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NoRoute { .. } => NavError::NoRouteFound,
            RouteError::Http { status } => NavError::ProviderHttp(status),
            RouteError::Network(message) => NavError::Network(message),
        }
    }
}

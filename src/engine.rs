//! Navigation state engine.
//!
//! Orchestrates the location, geocoding, route and home-store seams into
//! the Idle / Loading / Active session machine. Each intent runs as one
//! spawned unit of work; issuing a new intent supersedes the one in
//! flight (cancel-and-replace), and a generation counter keeps results
//! from superseded intents out of the published session.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::home::HomeLocation;
use crate::polyline::Polyline;
use crate::session::{NavError, NavMode, NavigationSession};
use crate::traits::{Geocoder, HomeStore, LocationProvider, RouteProvider, RouteQuery};

const NOTICE_CAPACITY: usize = 16;

/// Cheaply cloneable handle over the engine's shared internals.
///
/// Must live inside a tokio runtime: intents spawn onto it. State is
/// published through a single-writer watch channel; transient failures go
/// out as [`NavError`] notices on a broadcast channel.
#[derive(Clone)]
pub struct NavigationEngine {
    inner: Arc<Inner>,
}

struct Inner {
    location: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,
    routes: Arc<dyn RouteProvider>,
    home_store: Arc<dyn HomeStore>,
    session_tx: watch::Sender<NavigationSession>,
    notice_tx: broadcast::Sender<NavError>,
    /// Generation of the most recently issued intent. Publishes re-check
    /// it under this lock, so a superseded task cannot touch the session.
    generation: Mutex<u64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    /// Transient cached copy of the stored home record.
    home: Mutex<Option<HomeLocation>>,
}

impl NavigationEngine {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn Geocoder>,
        routes: Arc<dyn RouteProvider>,
        home_store: Arc<dyn HomeStore>,
    ) -> Self {
        let home = home_store.load();
        let (session_tx, _) = watch::channel(NavigationSession::idle());
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                location,
                geocoder,
                routes,
                home_store,
                session_tx,
                notice_tx,
                generation: Mutex::new(0),
                in_flight: Mutex::new(None),
                home: Mutex::new(home),
            }),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> NavigationSession {
        self.inner.session_tx.borrow().clone()
    }

    /// Observe session updates.
    pub fn subscribe(&self) -> watch::Receiver<NavigationSession> {
        self.inner.session_tx.subscribe()
    }

    /// Observe transient failure notices (toast-equivalents).
    pub fn notices(&self) -> broadcast::Receiver<NavError> {
        self.inner.notice_tx.subscribe()
    }

    /// Cached home record, refreshed at construction, on `navigate_home`
    /// store reads, and on `cancel`.
    pub fn home(&self) -> Option<HomeLocation> {
        self.inner.home.lock().clone()
    }

    /// Route the user from their current position to the stored home
    /// address. Without a stored address this fails immediately with
    /// [`NavError::HomeNotSet`] and touches no provider.
    pub fn navigate_home(&self) {
        let generation = self.inner.begin_intent();

        let home = self.inner.home_store.load();
        *self.inner.home.lock() = home.clone();
        let Some(home) = home else {
            self.inner.fail(generation, NavError::HomeNotSet);
            return;
        };

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            inner.run_intent(generation, Target::Home(home)).await;
        });
        self.inner.track(handle);
    }

    /// Geocode a free-text place query and route to the first candidate.
    /// Blank queries are a silent no-op: no state change, no provider
    /// calls, and any in-flight intent is left alone.
    pub fn search_and_navigate(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let generation = self.inner.begin_intent();
        let query = query.to_string();
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            inner.run_intent(generation, Target::Search(query)).await;
        });
        self.inner.track(handle);
    }

    /// Reset to Idle from any state, dropping whatever is in flight, and
    /// re-load the stored home record so the home marker reflects the
    /// last saved address rather than a recent search destination.
    /// Idempotent.
    pub fn cancel(&self) {
        let generation = self.inner.begin_intent();
        self.inner.publish(generation, |session| session.reset());
        *self.inner.home.lock() = self.inner.home_store.load();
    }
}

/// Destination of one intent: the stored home record, or a place query
/// still to be geocoded.
enum Target {
    Home(HomeLocation),
    Search(String),
}

impl Inner {
    /// Supersede whatever is in flight and claim the next generation.
    fn begin_intent(&self) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
        *generation
    }

    fn track(&self, handle: JoinHandle<()>) {
        // If a newer intent already superseded this one, its results are
        // discarded by the generation guard; the abort is best-effort.
        let mut in_flight = self.in_flight.lock();
        if let Some(stale) = in_flight.replace(handle) {
            stale.abort();
        }
    }

    /// Applies a session mutation only if `generation` is still current.
    fn publish(&self, generation: u64, apply: impl FnOnce(&mut NavigationSession)) -> bool {
        let current = self.generation.lock();
        if *current != generation {
            debug!(generation, current = *current, "discarding stale result");
            return false;
        }
        self.session_tx.send_modify(apply);
        true
    }

    /// Abandons the attempt: back to Idle, then the notice. The reset is
    /// published first so observers reacting to the notice see the
    /// post-failure session.
    fn fail(&self, generation: u64, error: NavError) {
        if self.publish(generation, |session| session.reset()) {
            warn!(%error, "navigation intent failed");
            let _ = self.notice_tx.send(error);
        }
    }

    /// The three network-touching steps, strictly sequential: location,
    /// geocode (searches only), route fetch.
    async fn run_intent(self: Arc<Self>, generation: u64, target: Target) {
        if !self.publish(generation, |session| session.mode = NavMode::Loading) {
            return;
        }

        let origin = match self.location.last_known().await {
            Ok(fix) => fix,
            Err(err) => {
                self.fail(generation, err.into());
                return;
            }
        };

        let destination = match target {
            Target::Home(home) => home.coordinate,
            Target::Search(query) => match self.geocoder.resolve(&query).await {
                Ok(hit) => hit,
                Err(err) => {
                    self.fail(generation, err.into());
                    return;
                }
            },
        };

        let query = RouteQuery::walking(origin, destination);
        let route = match self.routes.fetch_route(&query).await {
            Ok(route) => route,
            Err(err) => {
                self.fail(generation, err.into());
                return;
            }
        };

        let points = Polyline::decode(&route.polyline);
        let Some(leg) = route.legs.first() else {
            // Providers guarantee at least one leg; treat a bare result
            // as no route rather than violating the Active invariant.
            self.fail(generation, NavError::NoRouteFound);
            return;
        };
        if points.is_empty() {
            self.fail(generation, NavError::NoRouteFound);
            return;
        }

        let distance = leg.distance_text.clone();
        let duration = leg.duration_text.clone();
        self.publish(generation, move |session| {
            session.mode = NavMode::Active;
            session.route_points = points;
            session.display_distance = distance;
            session.display_duration = duration;
            session.destination = Some(destination);
        });
    }
}

//! Last-known device position source.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::geo::LatLng;
use crate::traits::{LocationError, LocationProvider};

/// A last-known-fix cell the platform layer feeds.
///
/// Whatever owns the OS location subsystem pushes fixes in with `update`;
/// the engine reads the most recent one out. Until the first fix ever
/// arrives, reads fail with `Unavailable` (the fresh-install case).
#[derive(Debug, Default)]
pub struct LastKnownLocation {
    fix: Mutex<Option<LatLng>>,
}

impl LastKnownLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out already holding a fix.
    pub fn with_fix(fix: LatLng) -> Self {
        Self {
            fix: Mutex::new(Some(fix)),
        }
    }

    /// Records a new fix, replacing any previous one.
    pub fn update(&self, fix: LatLng) {
        *self.fix.lock() = Some(fix);
    }
}

#[async_trait]
impl LocationProvider for LastKnownLocation {
    async fn last_known(&self) -> Result<LatLng, LocationError> {
        self.fix.lock().ok_or(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_before_first_fix() {
        let provider = LastKnownLocation::new();
        assert_eq!(
            provider.last_known().await,
            Err(LocationError::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_returns_latest_fix() {
        let provider = LastKnownLocation::new();
        provider.update(LatLng::new(56.16, 10.20));
        provider.update(LatLng::new(56.17, 10.21));
        assert_eq!(
            provider.last_known().await,
            Ok(LatLng::new(56.17, 10.21))
        );
    }
}

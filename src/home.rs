//! Persisted "home" record and its store implementations.

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo::LatLng;
use crate::traits::{HomeStore, StoreError};

/// The saved home address: a coordinate plus the display label the user
/// typed. Overwritten wholesale on save; presence is explicit, never
/// encoded as a sentinel coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub label: Option<String>,
    pub coordinate: LatLng,
}

impl HomeLocation {
    pub fn new(label: impl Into<String>, coordinate: LatLng) -> Self {
        Self {
            label: Some(label.into()),
            coordinate,
        }
    }

    pub fn unlabeled(coordinate: LatLng) -> Self {
        Self {
            label: None,
            coordinate,
        }
    }
}

/// In-memory store for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryHomeStore {
    slot: Mutex<Option<HomeLocation>>,
}

impl MemoryHomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_home(home: HomeLocation) -> Self {
        Self {
            slot: Mutex::new(Some(home)),
        }
    }
}

impl HomeStore for MemoryHomeStore {
    fn save(&self, home: &HomeLocation) -> Result<(), StoreError> {
        *self.slot.lock() = Some(home.clone());
        Ok(())
    }

    fn load(&self) -> Option<HomeLocation> {
        self.slot.lock().clone()
    }
}

/// Single-document JSON store at a caller-chosen path.
///
/// Writes land in a temp file first and are renamed into place, so a
/// crashed save never truncates the stored record.
#[derive(Debug, Clone)]
pub struct JsonHomeStore {
    path: PathBuf,
}

impl JsonHomeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HomeStore for JsonHomeStore {
    fn save(&self, home: &HomeLocation) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_vec_pretty(home)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, encoded)?;
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Option<HomeLocation> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(home) => Some(home),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unreadable home record, treating as unset");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryHomeStore::new();
        assert_eq!(store.load(), None);

        let home = HomeLocation::new("Åboulevarden 1", LatLng::new(56.1572, 10.2107));
        store.save(&home).unwrap();
        assert_eq!(store.load(), Some(home));
    }

    #[test]
    fn test_memory_store_overwrites_wholesale() {
        let store = MemoryHomeStore::with_home(HomeLocation::new(
            "Old place",
            LatLng::new(56.0, 10.0),
        ));

        let replacement = HomeLocation::unlabeled(LatLng::new(57.0, 9.9));
        store.save(&replacement).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.label, None);
        assert_eq!(loaded.coordinate, LatLng::new(57.0, 9.9));
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHomeStore::new(dir.path().join("home.json"));
        assert_eq!(store.load(), None);

        let home = HomeLocation::new("Åboulevarden 1", LatLng::new(56.1572, 10.2107));
        store.save(&home).unwrap();
        assert_eq!(store.load(), Some(home));
    }

    #[test]
    fn test_json_store_zero_zero_is_a_real_location() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHomeStore::new(dir.path().join("home.json"));

        let home = HomeLocation::unlabeled(LatLng::new(0.0, 0.0));
        store.save(&home).unwrap();
        assert_eq!(store.load(), Some(home));
    }

    #[test]
    fn test_json_store_corrupt_file_loads_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonHomeStore::new(path);
        assert_eq!(store.load(), None);
    }
}

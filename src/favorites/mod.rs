//! Bookmarked places
//!
//! `FavoritesStore` answers membership questions and applies save, remove and
//! toggle on top of a `FavoritesRepository`. Records are matched by the
//! configured `FavoriteKey`.

pub mod repository;

pub use repository::{FavoritesRepository, JsonFileRepository, MemoryRepository};

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::search::{Place, PlaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// A saved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub place_id: PlaceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl FavoriteRecord {
    /// Snapshot a place, stamped now
    pub fn from_place(place: &Place) -> Self {
        Self {
            place_id: place.id().clone(),
            name: place.name().to_string(),
            address: place.address().map(str::to_string),
            coordinate: place.coordinate(),
            category: place.category().map(str::to_string),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild the place this record was saved from
    pub fn to_place(&self) -> Place {
        let mut place = Place::new(self.place_id.clone(), Some(self.name.clone()), self.coordinate);
        if let Some(address) = &self.address {
            place = place.with_address(address.clone());
        }
        if let Some(category) = &self.category {
            place = place.with_category(category.clone());
        }
        place
    }
}

/// Identity used to decide whether two places are the same favorite
///
/// `Name` matches on display name only, so distinct places sharing a name
/// collapse into one favorite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteKey {
    #[default]
    PlaceId,
    Name,
}

impl FavoriteKey {
    fn matches(self, record: &FavoriteRecord, place: &Place) -> bool {
        match self {
            Self::PlaceId => &record.place_id == place.id(),
            Self::Name => record.name == place.name(),
        }
    }
}

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceId => write!(f, "place_id"),
            Self::Name => write!(f, "name"),
        }
    }
}

impl FromStr for FavoriteKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "place_id" | "id" => Ok(Self::PlaceId),
            "name" => Ok(Self::Name),
            _ => Err(Error::Config(format!(
                "Unknown favorites key: {}. Use 'place_id' or 'name'.",
                s
            ))),
        }
    }
}

/// Favorites with membership and toggle semantics
///
/// Every operation holds the repository lock for its full duration, so a
/// toggle's check and write cannot interleave with another caller.
pub struct FavoritesStore<R> {
    repo: Mutex<R>,
    key: FavoriteKey,
}

impl<R: FavoritesRepository> FavoritesStore<R> {
    pub fn new(repo: R, key: FavoriteKey) -> Self {
        Self {
            repo: Mutex::new(repo),
            key,
        }
    }

    pub fn key(&self) -> FavoriteKey {
        self.key
    }

    fn repo(&self) -> std::sync::MutexGuard<'_, R> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the place is saved
    pub fn is_favorite(&self, place: &Place) -> Result<bool> {
        let key = self.key;
        Ok(self.repo().count_where(&|r| key.matches(r, place))? > 0)
    }

    /// Save the place unless it is already a favorite
    pub fn save(&self, place: &Place) -> Result<()> {
        let key = self.key;
        let mut repo = self.repo();
        if repo.count_where(&|r| key.matches(r, place))? == 0 {
            repo.insert(FavoriteRecord::from_place(place))?;
            debug!("Saved favorite {}", place.id());
        }
        Ok(())
    }

    /// Remove every record matching the place; returns how many were removed
    pub fn remove(&self, place: &Place) -> Result<usize> {
        let key = self.key;
        let removed = self.repo().delete_where(&|r| key.matches(r, place))?;
        debug!("Removed {} favorite record(s) for {}", removed, place.id());
        Ok(removed)
    }

    /// Remove every record with this place id
    pub fn remove_id(&self, id: &PlaceId) -> Result<usize> {
        self.repo().delete_where(&|r| &r.place_id == id)
    }

    /// Flip membership; returns whether the place is now a favorite
    pub fn toggle(&self, place: &Place) -> Result<bool> {
        let key = self.key;
        let mut repo = self.repo();

        if repo.count_where(&|r| key.matches(r, place))? > 0 {
            repo.delete_where(&|r| key.matches(r, place))?;
            Ok(false)
        } else {
            repo.insert(FavoriteRecord::from_place(place))?;
            Ok(true)
        }
    }

    /// All favorites in the order they were saved
    pub fn list(&self) -> Result<Vec<FavoriteRecord>> {
        self.repo().list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn place(id: &str, name: &str) -> Place {
        Place::new(
            PlaceId::new(id),
            Some(name.to_string()),
            Coordinate::new(37.7749, -122.4194),
        )
        .with_category("hotel")
    }

    fn memory_store(key: FavoriteKey) -> FavoritesStore<MemoryRepository> {
        FavoritesStore::new(MemoryRepository::new(), key)
    }

    #[test]
    fn test_save_is_idempotent() {
        let store = memory_store(FavoriteKey::PlaceId);
        let p = place("osm:node/1", "Hotel A");

        assert!(!store.is_favorite(&p).unwrap());
        store.save(&p).unwrap();
        store.save(&p).unwrap();

        assert!(store.is_favorite(&p).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_not_an_error() {
        let store = memory_store(FavoriteKey::PlaceId);
        assert_eq!(store.remove(&place("x", "Nowhere")).unwrap(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let store = memory_store(FavoriteKey::PlaceId);
        let p = place("osm:node/1", "Hotel A");

        assert!(store.toggle(&p).unwrap());
        assert!(store.is_favorite(&p).unwrap());
        assert!(!store.toggle(&p).unwrap());
        assert!(!store.is_favorite(&p).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_place_id_key_keeps_same_named_places_apart() {
        let store = memory_store(FavoriteKey::PlaceId);
        let a = place("osm:node/1", "Grand Hotel");
        let b = place("osm:node/2", "Grand Hotel");

        store.save(&a).unwrap();
        assert!(!store.is_favorite(&b).unwrap());
        store.save(&b).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_name_key_collapses_same_named_places() {
        let store = memory_store(FavoriteKey::Name);
        let a = place("osm:node/1", "Grand Hotel");
        let b = place("osm:node/2", "Grand Hotel");

        store.save(&a).unwrap();
        assert!(store.is_favorite(&b).unwrap());

        // Toggling the other place removes the shared record
        assert!(!store.toggle(&b).unwrap());
        assert!(!store.is_favorite(&a).unwrap());
    }

    #[test]
    fn test_record_snapshot() {
        let p = place("osm:way/7", "Hotel B").with_address("1 Main St");
        let record = FavoriteRecord::from_place(&p);

        assert_eq!(record.place_id.as_str(), "osm:way/7");
        assert_eq!(record.address.as_deref(), Some("1 Main St"));
        assert_eq!(record.category.as_deref(), Some("hotel"));

        let back = record.to_place();
        assert_eq!(back, p);
        assert_eq!(back.address(), Some("1 Main St"));
    }

    #[test]
    fn test_remove_by_id() {
        let store = memory_store(FavoriteKey::PlaceId);
        store.save(&place("a", "A")).unwrap();
        store.save(&place("b", "B")).unwrap();

        assert_eq!(store.remove_id(&PlaceId::new("a")).unwrap(), 1);
        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "B");
    }

    #[test]
    fn test_concurrent_toggles_stay_consistent() {
        let store = Arc::new(memory_store(FavoriteKey::PlaceId));
        let p = place("osm:node/1", "Hotel A");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let p = p.clone();
                std::thread::spawn(move || store.toggle(&p).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // An even number of toggles leaves the place unsaved, with no duplicates
        assert!(!store.is_favorite(&p).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_toggles() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("favorites.json");
        let p = place("osm:node/1", "Hotel A");

        {
            let store =
                FavoritesStore::new(JsonFileRepository::load_from(path.clone()).unwrap(), FavoriteKey::PlaceId);
            assert!(store.toggle(&p).unwrap());
        }

        let store =
            FavoritesStore::new(JsonFileRepository::load_from(path).unwrap(), FavoriteKey::PlaceId);
        assert!(store.is_favorite(&p).unwrap());
    }

    #[test]
    fn test_persistence_failure_surfaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("favorites.json");
        let repo = JsonFileRepository::load_from(path.clone()).unwrap();
        std::fs::create_dir(&path).unwrap();

        let store = FavoritesStore::new(repo, FavoriteKey::PlaceId);
        let p = place("osm:node/1", "Hotel A");

        assert!(matches!(store.toggle(&p), Err(Error::Persistence(_))));
        assert!(!store.is_favorite(&p).unwrap());
    }

    #[test]
    fn test_key_parse_and_display() {
        assert_eq!("place_id".parse::<FavoriteKey>().unwrap(), FavoriteKey::PlaceId);
        assert_eq!("NAME".parse::<FavoriteKey>().unwrap(), FavoriteKey::Name);
        assert!("address".parse::<FavoriteKey>().is_err());
        assert_eq!(FavoriteKey::Name.to_string(), "name");
    }
}

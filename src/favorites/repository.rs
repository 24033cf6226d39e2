//! Favorites persistence
//!
//! A small CRUD surface (insert, delete-where, count-where, list-all) with an
//! in-memory and a JSON-file implementation. Favorites are stored in the XDG
//! data directory (~/.local/share/place-finder/) by default.

use crate::config::defaults::{APP_DIR_NAME, FAVORITES_FILE_NAME};
use crate::error::{Error, Result};
use crate::favorites::FavoriteRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Predicate selecting records
pub type RecordFilter<'a> = &'a dyn Fn(&FavoriteRecord) -> bool;

/// Storage backend for favorite records
pub trait FavoritesRepository: Send {
    /// Append a record
    fn insert(&mut self, record: FavoriteRecord) -> Result<()>;

    /// Delete every matching record, returning how many were removed
    fn delete_where(&mut self, filter: RecordFilter<'_>) -> Result<usize>;

    /// Count matching records
    fn count_where(&self, filter: RecordFilter<'_>) -> Result<usize>;

    /// All records in insertion order
    fn list_all(&self) -> Result<Vec<FavoriteRecord>>;
}

/// Records kept in memory only
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Vec<FavoriteRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesRepository for MemoryRepository {
    fn insert(&mut self, record: FavoriteRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn delete_where(&mut self, filter: RecordFilter<'_>) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|record| !filter(record));
        Ok(before - self.records.len())
    }

    fn count_where(&self, filter: RecordFilter<'_>) -> Result<usize> {
        Ok(self.records.iter().filter(|&record| filter(record)).count())
    }

    fn list_all(&self) -> Result<Vec<FavoriteRecord>> {
        Ok(self.records.clone())
    }
}

/// Records persisted as a pretty-printed JSON array
///
/// Every mutation rewrites the file. A failed write rolls the in-memory copy
/// back so memory and disk never disagree.
#[derive(Debug)]
pub struct JsonFileRepository {
    records: Vec<FavoriteRecord>,
    path: PathBuf,
}

impl JsonFileRepository {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Persistence("Could not determine data directory".to_string()))
    }

    /// Get the default favorites file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(FAVORITES_FILE_NAME))
    }

    /// Load favorites from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load favorites from a specific path; a missing file is an empty store
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Persistence(format!("Failed to read favorites file: {}", e))
            })?;

            serde_json::from_str(&content).map_err(|e| {
                Error::Persistence(format!("Failed to parse favorites file: {}", e))
            })?
        } else {
            Vec::new()
        };

        debug!("Loaded favorites from {}", path.display());
        Ok(Self { records, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save favorites to disk
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("Failed to create favorites directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.records).map_err(|e| {
            Error::Persistence(format!("Failed to serialize favorites: {}", e))
        })?;

        fs::write(&self.path, content).map_err(|e| {
            Error::Persistence(format!("Failed to write favorites file: {}", e))
        })?;

        Ok(())
    }

    /// Apply a mutation and persist it, undoing it if the write fails
    fn commit<T>(&mut self, mutate: impl FnOnce(&mut Vec<FavoriteRecord>) -> T) -> Result<T> {
        let snapshot = self.records.clone();
        let out = mutate(&mut self.records);

        if let Err(e) = self.save() {
            self.records = snapshot;
            return Err(e);
        }
        Ok(out)
    }
}

impl FavoritesRepository for JsonFileRepository {
    fn insert(&mut self, record: FavoriteRecord) -> Result<()> {
        self.commit(|records| records.push(record))
    }

    fn delete_where(&mut self, filter: RecordFilter<'_>) -> Result<usize> {
        if self.count_where(filter)? == 0 {
            return Ok(0);
        }
        self.commit(|records| {
            let before = records.len();
            records.retain(|record| !filter(record));
            before - records.len()
        })
    }

    fn count_where(&self, filter: RecordFilter<'_>) -> Result<usize> {
        Ok(self.records.iter().filter(|&record| filter(record)).count())
    }

    fn list_all(&self) -> Result<Vec<FavoriteRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::search::{Place, PlaceId};
    use tempfile::TempDir;

    fn record(id: &str, name: &str) -> FavoriteRecord {
        FavoriteRecord::from_place(&Place::new(
            PlaceId::new(id),
            Some(name.to_string()),
            Coordinate::new(37.7749, -122.4194),
        ))
    }

    fn create_test_repository() -> (JsonFileRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("favorites.json");
        let repository = JsonFileRepository::load_from(path).unwrap();
        (repository, temp_dir)
    }

    #[test]
    fn test_memory_repository_crud() {
        let mut repo = MemoryRepository::new();
        repo.insert(record("1", "Hotel A")).unwrap();
        repo.insert(record("2", "Hotel B")).unwrap();
        repo.insert(record("3", "Hotel A")).unwrap();

        assert_eq!(repo.count_where(&|r| r.name == "Hotel A").unwrap(), 2);
        assert_eq!(repo.delete_where(&|r| r.name == "Hotel A").unwrap(), 2);
        assert_eq!(repo.delete_where(&|r| r.name == "Hotel A").unwrap(), 0);

        let remaining = repo.list_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].place_id.as_str(), "2");
    }

    #[test]
    fn test_empty_file_repository() {
        let (repo, _temp) = create_test_repository();
        assert!(repo.list_all().unwrap().is_empty());
        assert!(!repo.path().exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("favorites.json");

        {
            let mut repo = JsonFileRepository::load_from(path.clone()).unwrap();
            repo.insert(record("1", "Hotel A")).unwrap();
            repo.insert(record("2", "Hotel B")).unwrap();
            repo.delete_where(&|r| r.place_id.as_str() == "1").unwrap();
        }

        let repo = JsonFileRepository::load_from(path).unwrap();
        let records = repo.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Hotel B");
    }

    #[test]
    fn test_insertion_order_kept() {
        let (mut repo, _temp) = create_test_repository();
        for (id, name) in [("c", "C"), ("a", "A"), ("b", "B")] {
            repo.insert(record(id, name)).unwrap();
        }

        let names: Vec<String> = repo.list_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_corrupt_file_is_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("favorites.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileRepository::load_from(path).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_failed_write_is_surfaced_and_rolled_back() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes every write fail
        let path = temp_dir.path().join("favorites.json");
        fs::create_dir(&path).unwrap();
        let mut repo = JsonFileRepository {
            records: Vec::new(),
            path,
        };

        let err = repo.insert(record("1", "Hotel A")).unwrap_err();

        assert!(matches!(err, Error::Persistence(_)));
        assert!(repo.list_all().unwrap().is_empty());
    }
}

//! Durable storage of the user's city list.
//!
//! Only `{id, name}` pairs are written, as one JSON array under a single key.
//! Reading never fails outward: a missing, unreadable or malformed slot
//! yields an empty list so the widget stays usable.

use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    error::PersistenceError,
    model::{City, CityId},
};

pub const STORAGE_KEY: &str = "weather-widget-cities";

/// A string key-value store that survives restarts.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the slot, so a crash
    /// mid-write leaves the previous contents intact.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, self.path_for(key)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

/// In-process store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCity {
    id: String,
    name: String,
}

/// Saves and restores the city list through a [`KeyValueStore`] slot.
#[derive(Debug)]
pub struct CityStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl CityStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend, key: STORAGE_KEY.to_string() }
    }

    /// Persist the `{id, name}` projection of `cities`, in order.
    /// Failures are logged and otherwise ignored.
    pub fn save(&self, cities: &[City]) {
        if let Err(err) = self.try_save(cities) {
            tracing::warn!(key = %self.key, error = %err, "failed to save cities");
        }
    }

    /// Restore the saved list with every transient field reset.
    /// Returns an empty list on any failure.
    pub fn load(&self) -> Vec<City> {
        match self.try_load() {
            Ok(cities) => cities,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to load cities, starting empty");
                Vec::new()
            }
        }
    }

    fn try_save(&self, cities: &[City]) -> Result<(), PersistenceError> {
        let data: Vec<StoredCity> = cities
            .iter()
            .map(|c| StoredCity { id: c.id.to_string(), name: c.name.clone() })
            .collect();
        let json = serde_json::to_string(&data)?;
        self.backend.set(&self.key, &json)
    }

    fn try_load(&self) -> Result<Vec<City>, PersistenceError> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };

        decode(&raw)
    }
}

fn decode(raw: &str) -> Result<Vec<City>, PersistenceError> {
    let stored: Vec<StoredCity> =
        serde_json::from_str(raw).map_err(|e| PersistenceError::Decode(e.to_string()))?;

    if let Some(pos) = stored.iter().position(|c| c.id.trim().is_empty()) {
        return Err(PersistenceError::Decode(format!("entry {pos} has an empty id")));
    }

    Ok(stored.into_iter().map(|c| City::new(CityId::from(c.id), c.name)).collect())
}

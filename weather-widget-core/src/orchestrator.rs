//! The user's list of cities and the weather fetches that keep it current.
//!
//! Every mutation of the list happens inside one short critical section and
//! the lock is never held across an `.await`, so the list behaves as if it were
//! owned by a single logical thread. Fetches run as independent tasks. A task
//! only remembers the id of the city it serves; when it settles it looks the
//! city up again and drops its result if the city has been removed meanwhile.
//! That lookup stands in for cancellation, which the HTTP layer doesn't offer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;

use crate::{
    config::Config,
    error::{FetchError, MountError, ValidationError, WidgetError},
    location::{CoordinateProvider, FixedPosition, Geolocation},
    model::{City, CityId, WeatherRecord},
    provider::{OpenWeatherClient, WeatherFetcher, WeatherQuery},
    storage::{CityStore, FileStore},
};

/// Owns the city list and coordinates fetching and persistence for it.
///
/// Operations that start a fetch spawn onto the current Tokio runtime and must
/// be called from within one.
#[derive(Debug)]
pub struct CityList {
    cities: Arc<Mutex<Vec<City>>>,
    store: CityStore,
    fetcher: Arc<dyn WeatherFetcher>,
    location: Arc<dyn CoordinateProvider>,
    tasks: Mutex<JoinSet<()>>,
}

impl CityList {
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        store: CityStore,
        location: Arc<dyn CoordinateProvider>,
    ) -> Self {
        Self {
            cities: Arc::new(Mutex::new(Vec::new())),
            store,
            fetcher,
            location,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Wire up the production collaborators from the embedder's configuration.
    ///
    /// A missing API key is reported as [`MountError::MissingApiKey`] before
    /// anything else is touched.
    pub fn from_config(config: &Config) -> Result<Self, MountError> {
        let client = OpenWeatherClient::from_config(config)?;

        let dir = config.storage_dir().map_err(|e| MountError::Storage(e.to_string()))?;
        let store = CityStore::new(Box::new(FileStore::new(dir)));

        let location = match config.home {
            Some(home) => Geolocation::new(Box::new(FixedPosition(home))),
            None => Geolocation::unsupported(),
        };

        Ok(Self::new(Arc::new(client), store, Arc::new(location)))
    }

    /// Load the persisted cities and start a fetch for each of them.
    pub fn initialize(&self) {
        self.restore();
        self.refresh_all();
    }

    /// Populate the list from storage without fetching anything.
    ///
    /// Cities already in memory under the same id keep their current state,
    /// so restoring twice never doubles up in-flight fetches. Cities held in
    /// memory but missing from storage (a save that failed) stay, after the
    /// restored ones. Returns the number of cities in the list afterwards.
    pub fn restore(&self) -> usize {
        let loaded = self.store.load();
        tracing::debug!(count = loaded.len(), "restoring saved cities");

        let mut cities = lock(&self.cities);
        let mut previous = std::mem::take(&mut *cities);
        for restored in loaded {
            let city = match previous.iter().position(|c| c.id == restored.id) {
                Some(pos) => previous.remove(pos),
                None => restored,
            };
            cities.push(city);
        }
        if !previous.is_empty() {
            tracing::debug!(count = previous.len(), "keeping cities missing from storage");
            cities.append(&mut previous);
        }
        cities.len()
    }

    /// Append a city by name and start fetching its weather.
    ///
    /// The list is persisted before the fetch is issued.
    pub fn add_by_name(&self, name: &str) -> Result<CityId, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCityName);
        }

        let city = City::new(CityId::generate(), name);
        let id = city.id.clone();
        {
            let mut cities = lock(&self.cities);
            cities.push(city);
            self.store.save(&cities);
        }
        tracing::info!(%id, name, "city added");

        self.refresh(&id);
        Ok(id)
    }

    /// Append the city at the user's current position.
    ///
    /// The position is looked up first and the weather is fetched by
    /// coordinates; the city takes its name from the provider's answer and is
    /// added already loaded. If either step fails the list is left untouched
    /// and the error is returned.
    pub async fn add_by_location(&self) -> Result<CityId, WidgetError> {
        let coords = self.location.current_position().await?;
        let record = self.fetcher.get_weather_by_coordinates(coords).await?;

        let name = match record.name.trim() {
            "" => coords.to_string(),
            name => name.to_string(),
        };

        let mut city = City::new(CityId::generate(), name);
        city.weather = Some(record);
        let id = city.id.clone();
        {
            let mut cities = lock(&self.cities);
            cities.push(city);
            self.store.save(&cities);
        }
        tracing::info!(%id, %coords, "city added from current location");

        Ok(id)
    }

    /// Drop a city and persist the list. Returns `false` if no such city exists.
    pub fn remove(&self, id: &CityId) -> bool {
        let mut cities = lock(&self.cities);
        let Some(pos) = cities.iter().position(|c| &c.id == id) else {
            return false;
        };

        let removed = cities.remove(pos);
        self.store.save(&cities);
        tracing::info!(%id, name = %removed.name, "city removed");
        true
    }

    /// Re-fetch a city's weather by its stored name.
    ///
    /// Does nothing, and returns `false`, when the city is unknown or a fetch
    /// for it is already in flight.
    pub fn refresh(&self, id: &CityId) -> bool {
        let name = {
            let mut cities = lock(&self.cities);
            let Some(city) = cities.iter_mut().find(|c| &c.id == id) else {
                return false;
            };
            if city.loading {
                tracing::debug!(%id, "refresh skipped, fetch already in flight");
                return false;
            }
            city.loading = true;
            city.error = None;
            city.name.clone()
        };

        self.spawn_fetch(id.clone(), name);
        true
    }

    /// Refresh every city that isn't already loading. Returns how many fetches started.
    pub fn refresh_all(&self) -> usize {
        let ids: Vec<CityId> = lock(&self.cities).iter().map(|c| c.id.clone()).collect();
        ids.iter().filter(|id| self.refresh(id)).count()
    }

    /// Wait until every fetch started so far, and any started while waiting, has settled.
    pub async fn settled(&self) {
        loop {
            let mut pending = std::mem::take(&mut *lock(&self.tasks));
            if pending.is_empty() {
                return;
            }
            while let Some(res) = pending.join_next().await {
                if let Err(err) = res {
                    tracing::warn!(error = %err, "weather fetch task did not complete");
                }
            }
        }
    }

    /// Snapshot of the list in display order.
    pub fn cities(&self) -> Vec<City> {
        lock(&self.cities).clone()
    }

    pub fn city(&self, id: &CityId) -> Option<City> {
        lock(&self.cities).iter().find(|c| &c.id == id).cloned()
    }

    /// First city whose name matches `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<City> {
        let name = name.trim();
        lock(&self.cities).iter().find(|c| c.name.eq_ignore_ascii_case(name)).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.cities).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cities).is_empty()
    }

    fn spawn_fetch(&self, id: CityId, name: String) {
        let fetcher = Arc::clone(&self.fetcher);
        let cities = Arc::clone(&self.cities);

        let mut tasks = lock(&self.tasks);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let result = fetcher.get_weather(&WeatherQuery::City(name)).await;
            settle(&cities, &id, result);
        });
    }
}

fn settle(cities: &Mutex<Vec<City>>, id: &CityId, result: Result<WeatherRecord, FetchError>) {
    let mut cities = lock(cities);
    let Some(city) = cities.iter_mut().find(|c| &c.id == id) else {
        tracing::debug!(%id, "city removed before its fetch settled, dropping result");
        return;
    };

    match result {
        Ok(record) => {
            tracing::debug!(%id, name = %city.name, "weather updated");
            city.weather = Some(record);
            city.error = None;
        }
        Err(err) => {
            tracing::warn!(%id, name = %city.name, error = %err, "weather fetch failed");
            city.weather = None;
            city.error = Some(err.to_string());
        }
    }
    city.loading = false;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

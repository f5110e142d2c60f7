//! Core library for the weather widget.
//!
//! This crate defines:
//! - The city list that drives per-city weather fetches
//! - Persistence of that list in a key-value slot
//! - The OpenWeather client and the current-position lookup
//! - Configuration and the error taxonomy shared by all of the above
//!
//! It is used by `weather-widget-cli`, but any host that can supply an API key
//! can mount it.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod storage;

pub use config::Config;
pub use error::{FetchError, LocationError, MountError, ValidationError, WidgetError};
pub use location::{CoordinateProvider, FixedPosition, Geolocation, PositionOptions};
pub use model::{City, CityId, CityStatus, Coordinates, WeatherRecord};
pub use orchestrator::CityList;
pub use provider::{OpenWeatherClient, WeatherFetcher, WeatherQuery};
pub use storage::{CityStore, FileStore, KeyValueStore, MemoryStore};

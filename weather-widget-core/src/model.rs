use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identity of a city entry, stable for as long as the city stays in the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(String);

impl CityId {
    /// Fresh random id for a newly added city.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Where a city currently is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A user-tracked city with its transient weather state.
///
/// Only `id` and `name` survive a reload; everything else is recomputed
/// by fetching again.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub weather: Option<WeatherRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

impl City {
    pub fn new(id: CityId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), weather: None, loading: false, error: None }
    }

    pub fn status(&self) -> CityStatus {
        if self.loading {
            CityStatus::Loading
        } else if self.error.is_some() {
            CityStatus::Failed
        } else if self.weather.is_some() {
            CityStatus::Loaded
        } else {
            CityStatus::Idle
        }
    }
}

/// Current weather as returned by the provider, units already metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub name: String,
    pub sys: WeatherSystem,
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub visibility: Option<u32>,
    pub dt: i64,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub cod: i64,
    #[serde(default)]
    pub coord: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSystem {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u8,
    #[serde(default)]
    pub sea_level: Option<u32>,
    #[serde(default)]
    pub grnd_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl WeatherRecord {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// Offset of the city's local time from UTC.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.timezone)
    }

    pub fn local_observed_at(&self) -> Option<DateTime<FixedOffset>> {
        Some(self.observed_at()?.with_timezone(&self.utc_offset()?))
    }

    pub fn sunrise_at(&self) -> Option<DateTime<FixedOffset>> {
        self.local_time(self.sys.sunrise?)
    }

    pub fn sunset_at(&self) -> Option<DateTime<FixedOffset>> {
        self.local_time(self.sys.sunset?)
    }

    /// The first condition descriptor; the provider lists the dominant one first.
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    fn local_time(&self, ts: i64) -> Option<DateTime<FixedOffset>> {
        Some(DateTime::from_timestamp(ts, 0)?.with_timezone(&self.utc_offset()?))
    }
}

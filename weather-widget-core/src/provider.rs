use async_trait::async_trait;
use std::fmt::{self, Debug};

use crate::{
    error::FetchError,
    model::{Coordinates, WeatherRecord},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// What a single current-weather request is keyed on.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherQuery::City(name) => f.write_str(name),
            WeatherQuery::Coordinates(coords) => write!(f, "({coords})"),
        }
    }
}

/// Source of current weather. Every call is exactly one attempt.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn get_weather_by_city(&self, name: &str) -> Result<WeatherRecord, FetchError>;

    async fn get_weather_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherRecord, FetchError>;

    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherRecord, FetchError> {
        match query {
            WeatherQuery::City(name) => self.get_weather_by_city(name).await,
            WeatherQuery::Coordinates(coords) => self.get_weather_by_coordinates(*coords).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_display() {
        assert_eq!(WeatherQuery::City("Oslo".into()).to_string(), "Oslo");
        assert_eq!(
            WeatherQuery::Coordinates(Coordinates::new(59.9139, 10.7522)).to_string(),
            "(59.9139, 10.7522)"
        );
    }
}

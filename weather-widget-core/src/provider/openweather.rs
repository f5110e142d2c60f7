use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    error::{FetchError, MountError},
    model::{Coordinates, WeatherRecord},
};

use super::{WeatherFetcher, WeatherQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

const UNITS: &str = "metric";
const ICON_SIZE: &str = "2x";

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    /// Fails with [`MountError::MissingApiKey`] when `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MountError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(MountError::MissingApiKey);
        }

        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() })
    }

    /// Build a client from the widget configuration: key, base URL and optional request timeout.
    pub fn from_config(config: &Config) -> Result<Self, MountError> {
        let mut client = Self::new(config.api_key()?)?;

        if let Some(base_url) = config.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            client = client.with_base_url(base_url);
        }

        if let Some(timeout) = config.request_timeout() {
            let http = Client::builder().timeout(timeout).build().map_err(MountError::HttpClient)?;
            client = client.with_http_client(http);
        }

        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Display URL for a provider icon code such as `"10d"`.
    pub fn icon_url_for(code: &str) -> String {
        format!("{ICON_BASE_URL}/{code}@{ICON_SIZE}.png")
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, FetchError> {
        let url = format!("{}/weather", self.base_url);

        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::City(name) => vec![("q", name.clone())],
            WeatherQuery::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        };
        params.push(("units", UNITS.to_string()));
        params.push(("appid", self.api_key.clone()));

        tracing::debug!(%query, "requesting current weather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            // Error bodies are usually `{"cod": "404", "message": "city not found"}`,
            // but proxies may hand back HTML or nothing at all.
            let message = serde_json::from_str::<OwErrorBody>(&body).ok().and_then(|e| e.message);
            let err = FetchError::from_status(status.as_u16(), message);
            tracing::debug!(%query, %status, error = %err, "weather request failed");
            return Err(err);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    async fn get_weather_by_city(&self, name: &str) -> Result<WeatherRecord, FetchError> {
        self.fetch(&WeatherQuery::City(name.to_string())).await
    }

    async fn get_weather_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherRecord, FetchError> {
        self.fetch(&WeatherQuery::Coordinates(coords)).await
    }
}

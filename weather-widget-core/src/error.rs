//! Error taxonomy shared by the widget core.

use thiserror::Error;

/// Bad user input. Never reaches the network or storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a city name")]
    EmptyCityName,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported by this host")]
    Unsupported,

    #[error("Geolocation error: {0}")]
    DeniedOrTimeout(String),
}

/// A failed weather request, classified by what the provider told us.
///
/// The `Display` text is what ends up in a city's `error` field.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City not found. Please check the spelling.")]
    NotFound,

    #[error("Invalid API key. Please check your configuration.")]
    InvalidApiKey,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("{0}")]
    Provider(String),

    #[error("Failed to fetch weather data")]
    Status(u16),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read weather data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Classify a non-success response. `provider_message` is the optional
    /// `message` field of the error body.
    pub fn from_status(status: u16, provider_message: Option<String>) -> Self {
        match status {
            404 => Self::NotFound,
            401 => Self::InvalidApiKey,
            429 => Self::RateLimited,
            _ => match provider_message.filter(|m| !m.trim().is_empty()) {
                Some(message) => Self::Provider(message),
                None => Self::Status(status),
            },
        }
    }
}

/// Internal storage failure. Logged and defaulted, never shown to the user.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored city list is malformed: {0}")]
    Decode(String),

    #[error("failed to encode city list: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The embedding environment failed to provide what the widget needs to start.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("api-key is required")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("could not determine where to store cities: {0}")]
    Storage(String),
}

/// Errors surfaced to the caller of a city list operation.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

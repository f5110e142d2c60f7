//! Current-position lookup on top of whatever location capability the host offers.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{error::LocationError, model::Coordinates};

/// City-level weather needs neither precise nor slow fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), high_accuracy: false }
    }
}

/// Resolves the user's current coordinates once per call.
#[async_trait]
pub trait CoordinateProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// The host's raw one-shot position query. Errors are the host's own message
/// (permission denied, position unavailable, ...).
#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn query(&self, options: &PositionOptions) -> Result<Coordinates, String>;
}

/// Coordinates known up front, e.g. a home location from the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn query(&self, _options: &PositionOptions) -> Result<Coordinates, String> {
        Ok(self.0)
    }
}

/// Adapts an optional host [`PositionSource`] into a [`CoordinateProvider`].
///
/// No source means the host has no location capability at all. A single
/// failed or timed-out query is reported as is; there are no retries.
#[derive(Debug)]
pub struct Geolocation {
    source: Option<Box<dyn PositionSource>>,
    options: PositionOptions,
}

impl Geolocation {
    pub fn new(source: Box<dyn PositionSource>) -> Self {
        Self { source: Some(source), options: PositionOptions::default() }
    }

    pub fn unsupported() -> Self {
        Self { source: None, options: PositionOptions::default() }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }
}

#[async_trait]
impl CoordinateProvider for Geolocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let source = self.source.as_ref().ok_or(LocationError::Unsupported)?;

        match tokio::time::timeout(self.options.timeout, source.query(&self.options)).await {
            Ok(Ok(coords)) => Ok(coords),
            Ok(Err(message)) => Err(LocationError::DeniedOrTimeout(message)),
            Err(_) => Err(LocationError::DeniedOrTimeout("Timeout expired".to_string())),
        }
    }
}

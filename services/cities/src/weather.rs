//! Weather lookups and the staleness-based refresh policy
//!
//! Readings older than the staleness threshold are refetched from the
//! temperature source, one independent lookup per city. A failed lookup leaves
//! that city's previous reading in place and is retried on the next refresh.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{models::City, repositories::CityRepository};

/// Default staleness threshold in seconds
pub const DEFAULT_STALE_AFTER_SECONDS: i64 = 60;

/// Weather client configuration
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Base URL of the Open-Meteo compatible API
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Age in seconds after which a reading is refetched
    pub stale_after_seconds: i64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com".to_string(),
            timeout_seconds: 10,
            stale_after_seconds: DEFAULT_STALE_AFTER_SECONDS,
        }
    }
}

impl WeatherConfig {
    /// Create a new WeatherConfig from environment variables
    ///
    /// # Environment Variables
    /// - `WEATHER_BASE_URL`: API base URL (default: "https://api.open-meteo.com")
    /// - `WEATHER_TIMEOUT_SECONDS`: Request timeout (default: 10)
    /// - `WEATHER_STALE_AFTER_SECONDS`: Staleness threshold (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("WEATHER_BASE_URL").unwrap_or(defaults.base_url);

        let timeout_seconds = std::env::var("WEATHER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout_seconds);

        let stale_after_seconds = std::env::var("WEATHER_STALE_AFTER_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.stale_after_seconds);

        Self {
            base_url,
            timeout_seconds,
            stale_after_seconds,
        }
    }
}

/// Error from a single temperature lookup
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Network failure or timeout
    #[error("Weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Weather service returned status {0}")]
    Status(u16),

    /// Upstream answer did not carry a temperature
    #[error("Weather response could not be decoded: {0}")]
    Decode(String),
}

/// Source of current temperatures
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Current instantaneous temperature at the given coordinates
    async fn current_temperature(&self, latitude: f64, longitude: f64)
    -> Result<f64, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

/// Open-Meteo forecast API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Build a client with the configured timeout
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TemperatureSource for OpenMeteoClient {
    async fn current_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: ForecastResponse = response.json().await?;
        body.current_weather
            .map(|current| current.temperature)
            .ok_or_else(|| WeatherError::Decode("missing current_weather".to_string()))
    }
}

/// Whether a city's reading is missing or older than the threshold
pub fn is_stale(city: &City, now: DateTime<Utc>, threshold: Duration) -> bool {
    match (city.temperature, city.updated_at) {
        (Some(_), Some(updated_at)) => updated_at < now - threshold,
        _ => true,
    }
}

/// Outcome of one refresh batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Cities that received a new reading
    pub updated: usize,
    /// Cities whose lookup or write failed
    pub failed: Vec<Uuid>,
    /// Cities removed between selection and write
    pub skipped: usize,
}

/// Refresh policy over one user's cities
#[derive(Clone)]
pub struct WeatherRefresher {
    cities: CityRepository,
    source: Arc<dyn TemperatureSource>,
    stale_after: Duration,
}

impl WeatherRefresher {
    /// Create a new refresher
    pub fn new(
        cities: CityRepository,
        source: Arc<dyn TemperatureSource>,
        stale_after_seconds: i64,
    ) -> Self {
        Self {
            cities,
            source,
            stale_after: Duration::seconds(stale_after_seconds),
        }
    }

    /// The owner's cities whose reading is missing or stale at `now`
    pub async fn select_stale(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> common::error::DatabaseResult<Vec<City>> {
        let cities = self.cities.list_for(owner).await?;

        Ok(cities
            .into_iter()
            .filter(|city| is_stale(city, now, self.stale_after))
            .collect())
    }

    /// Look up every given city concurrently and store the results
    ///
    /// Failures are logged and counted; they never stop the other lookups.
    pub async fn refresh(&self, cities: &[City], now: DateTime<Utc>) -> RefreshSummary {
        let lookups = cities.iter().map(|city| async move {
            let outcome = self.refresh_one(city, now).await;
            (city, outcome)
        });

        let mut summary = RefreshSummary::default();
        for (city, outcome) in join_all(lookups).await {
            match outcome {
                Ok(true) => summary.updated += 1,
                Ok(false) => {
                    debug!(
                        city_id = %city.id,
                        "City {} was removed before its reading was stored",
                        city.name
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        city_id = %city.id,
                        latitude = city.latitude,
                        longitude = city.longitude,
                        "Failed to refresh temperature for {}: {}",
                        city.name,
                        e
                    );
                    summary.failed.push(city.id);
                }
            }
        }

        info!(
            "Weather refresh finished: {} updated, {} failed, {} skipped",
            summary.updated,
            summary.failed.len(),
            summary.skipped
        );
        summary
    }

    /// Select the owner's stale cities and refresh them
    pub async fn refresh_stale(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> common::error::DatabaseResult<RefreshSummary> {
        let stale = self.select_stale(owner, now).await?;
        info!("Refreshing {} stale cities for user {}", stale.len(), owner);
        Ok(self.refresh(&stale, now).await)
    }

    /// `Ok(false)` when the city no longer exists at write time
    async fn refresh_one(&self, city: &City, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let temperature = self
            .source
            .current_temperature(city.latitude, city.longitude)
            .await?;

        Ok(self.cities.apply_temperature(city, temperature, now).await?)
    }
}

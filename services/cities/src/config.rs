//! Service configuration assembled from the environment

use anyhow::Result;
use common::database::DatabaseConfig;
use std::path::PathBuf;

use crate::{session::SessionConfig, weather::WeatherConfig};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_address: String,
    /// CSV file the default cities are loaded from
    pub seed_file: PathBuf,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDRESS`: Listen address (default: "0.0.0.0:3000")
    /// - `SEED_FILE`: Default city CSV (default: "europe.csv")
    pub fn from_env() -> Self {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let seed_file = std::env::var("SEED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("europe.csv"));

        Self {
            bind_address,
            seed_file,
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub weather: WeatherConfig,
}

impl Config {
    /// Load every section from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            weather: WeatherConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        unsafe {
            std::env::remove_var("BIND_ADDRESS");
            std::env::remove_var("SEED_FILE");
            std::env::remove_var("WEATHER_BASE_URL");
            std::env::remove_var("WEATHER_TIMEOUT_SECONDS");
            std::env::remove_var("WEATHER_STALE_AFTER_SECONDS");
            std::env::set_var("SESSION_SECRET", "config-test");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.seed_file, PathBuf::from("europe.csv"));
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.stale_after_seconds, 60);
        assert_eq!(config.session.max_age_seconds, 3600);

        unsafe {
            std::env::remove_var("SESSION_SECRET");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("SESSION_SECRET", "config-test");
            std::env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("WEATHER_STALE_AFTER_SECONDS", "120");
            std::env::set_var("WEATHER_TIMEOUT_SECONDS", "not-a-number");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.weather.stale_after_seconds, 120);
        assert_eq!(config.weather.timeout_seconds, 10);

        unsafe {
            std::env::remove_var("SESSION_SECRET");
            std::env::remove_var("BIND_ADDRESS");
            std::env::remove_var("WEATHER_STALE_AFTER_SECONDS");
            std::env::remove_var("WEATHER_TIMEOUT_SECONDS");
        }
    }

    #[test]
    #[serial]
    fn test_config_requires_session_secret() {
        unsafe {
            std::env::remove_var("SESSION_SECRET");
        }
        assert!(Config::from_env().is_err());
    }
}

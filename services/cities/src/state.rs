//! Application state shared across handlers

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    repositories::{CityRepository, DefaultCityRepository, UserRepository},
    session::{SessionConfig, SessionService},
    weather::{TemperatureSource, WeatherRefresher},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub city_repository: CityRepository,
    pub default_city_repository: DefaultCityRepository,
    pub session_service: SessionService,
    pub weather_refresher: WeatherRefresher,
}

impl AppState {
    /// Wire repositories and services around one pool
    pub fn new(
        db_pool: SqlitePool,
        session_config: SessionConfig,
        temperature_source: Arc<dyn TemperatureSource>,
        stale_after_seconds: i64,
    ) -> Self {
        let city_repository = CityRepository::new(db_pool.clone());
        let weather_refresher = WeatherRefresher::new(
            city_repository.clone(),
            temperature_source,
            stale_after_seconds,
        );

        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            default_city_repository: DefaultCityRepository::new(db_pool.clone()),
            session_service: SessionService::new(session_config),
            city_repository,
            weather_refresher,
            db_pool,
        }
    }
}

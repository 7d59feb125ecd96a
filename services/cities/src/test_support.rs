//! Shared fixtures for unit tests

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    models::NewCity,
    weather::{TemperatureSource, WeatherError},
};

/// Fresh migrated in-memory database
pub async fn test_pool() -> SqlitePool {
    let pool = common::database::init_pool(&common::database::DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    common::database::run_migrations(&pool, &crate::MIGRATOR)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Insert a bare user row and return its id
pub async fn user(pool: &SqlitePool, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, 'x', ?3)")
        .bind(id)
        .bind(username)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert user");
    id
}

pub fn city(name: &str, latitude: f64, longitude: f64) -> NewCity {
    NewCity {
        name: name.to_string(),
        latitude,
        longitude,
    }
}

/// Temperature source answering from a fixed table; unknown coordinates fail
#[derive(Default)]
pub struct StubSource {
    readings: HashMap<(u64, u64), f64>,
}

impl StubSource {
    pub fn with(mut self, latitude: f64, longitude: f64, temperature: f64) -> Self {
        self.readings
            .insert((latitude.to_bits(), longitude.to_bits()), temperature);
        self
    }
}

#[async_trait]
impl TemperatureSource for StubSource {
    async fn current_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, WeatherError> {
        self.readings
            .get(&(latitude.to_bits(), longitude.to_bits()))
            .copied()
            .ok_or(WeatherError::Status(503))
    }
}

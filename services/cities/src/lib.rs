//! Multi-user city temperature service
//!
//! Users register, log in and keep a personal list of cities whose current
//! temperatures are fetched from an external weather API and cached until
//! they go stale.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;
pub mod validation;
pub mod weather;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use common::database::{self, DatabaseConfig};
use sqlx::migrate::Migrator;
use std::{path::Path, sync::Arc};
use tracing::info;

use crate::{
    repositories::DefaultCityRepository,
    session::SessionConfig,
    state::AppState,
    weather::TemperatureSource,
};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the database, migrate it, seed the default cities and wire the state
pub async fn build_state(
    db_config: &DatabaseConfig,
    session_config: SessionConfig,
    temperature_source: Arc<dyn TemperatureSource>,
    stale_after_seconds: i64,
    seed_file: &Path,
) -> Result<AppState> {
    let pool = database::init_pool(db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &MIGRATOR).await?;

    seed::ensure_seeded(&DefaultCityRepository::new(pool.clone()), seed_file).await?;

    Ok(AppState::new(
        pool,
        session_config,
        temperature_source,
        stale_after_seconds,
    ))
}

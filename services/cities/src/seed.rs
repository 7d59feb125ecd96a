//! Default city seeding
//!
//! The shared template list is loaded once from a CSV file with a
//! `name,latitude,longitude` header, and copied into each new account.

use anyhow::{Context, Result};
use common::error::DatabaseResult;
use sqlx::SqliteConnection;
use std::{io::Read, path::Path};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::NewCity,
    repositories::{DefaultCityRepository, city, default_city},
};

/// Parse seed rows from CSV
pub fn parse_seed<R: Read>(reader: R) -> Result<Vec<NewCity>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<NewCity>().enumerate() {
        // Header is line 1
        let row = record.with_context(|| format!("Invalid seed row on line {}", index + 2))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Load the default cities from the seed file if none are stored yet
///
/// Returns how many templates were inserted; zero when the table was already
/// populated or the seed file is missing.
pub async fn ensure_seeded(repo: &DefaultCityRepository, path: &Path) -> Result<usize> {
    if !repo.is_empty().await? {
        info!("Default cities already present, skipping seed");
        return Ok(0);
    }

    if !path.exists() {
        warn!(
            "Seed file {} not found, new users will start with no cities",
            path.display()
        );
        return Ok(0);
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open seed file {}", path.display()))?;
    let rows = parse_seed(file)?;

    let inserted = repo.insert_all(&rows).await?;
    info!("Seeded {} default cities from {}", inserted, path.display());

    Ok(inserted)
}

/// Copy every default city into the owner's list on the given connection
pub async fn seed_new_user(conn: &mut SqliteConnection, owner: Uuid) -> DatabaseResult<usize> {
    let templates: Vec<NewCity> = default_city::all_on(&mut *conn)
        .await?
        .iter()
        .map(NewCity::from)
        .collect();

    city::seed_for_user(conn, owner, &templates).await
}

//! City repository: ownership-scoped CRUD over a user's city list

use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::models::{City, NewCity};

const CITY_COLUMNS: &str = "id, user_id, name, latitude, longitude, temperature, updated_at";

/// City repository
#[derive(Clone)]
pub struct CityRepository {
    pool: SqlitePool,
}

impl CityRepository {
    /// Create a new city repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a city to the owner's list, without any reading yet
    pub async fn add(&self, owner: Uuid, city: &NewCity) -> DatabaseResult<City> {
        info!("Adding city {} for user {}", city.name, owner);

        let mut conn = self.pool.acquire().await.map_err(DatabaseError::Connection)?;
        insert_city(&mut *conn, owner, city).await
    }

    /// Remove a city if, and only if, it belongs to the owner
    ///
    /// Returns whether a row was deleted.
    pub async fn remove(&self, owner: Uuid, city_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM cities WHERE id = ?1 AND user_id = ?2")
            .bind(city_id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Removed city {} for user {}", city_id, owner);
        } else {
            info!("City {} not found for user {}, nothing removed", city_id, owner);
        }

        Ok(deleted)
    }

    /// All of the owner's cities, warmest first, cities without a reading last
    pub async fn list_for(&self, owner: Uuid) -> DatabaseResult<Vec<City>> {
        let cities = sqlx::query_as::<_, City>(&format!(
            "SELECT {CITY_COLUMNS} FROM cities
             WHERE user_id = ?1
             ORDER BY temperature IS NULL, temperature DESC, rowid"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(cities)
    }

    /// Replace the owner's whole list with one fresh city per template
    ///
    /// Runs in a single transaction: if any insert fails the deletes are
    /// rolled back along with it.
    pub async fn reset_to(&self, owner: Uuid, templates: &[NewCity]) -> DatabaseResult<()> {
        info!(
            "Resetting cities for user {} to {} defaults",
            owner,
            templates.len()
        );

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        sqlx::query("DELETE FROM cities WHERE user_id = ?1")
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        seed_for_user(&mut *tx, owner, templates).await?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(())
    }

    /// Record a fresh reading; temperature and timestamp are always set together
    pub async fn apply_temperature(
        &self,
        city: &City,
        temperature: f64,
        at: DateTime<Utc>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE cities SET temperature = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4",
        )
        .bind(temperature)
        .bind(at)
        .bind(city.id)
        .bind(city.user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert one city per template for the owner on the given connection
pub async fn seed_for_user(
    conn: &mut SqliteConnection,
    owner: Uuid,
    templates: &[NewCity],
) -> DatabaseResult<usize> {
    for template in templates {
        insert_city(conn, owner, template).await?;
    }

    Ok(templates.len())
}

async fn insert_city(
    conn: &mut SqliteConnection,
    owner: Uuid,
    city: &NewCity,
) -> DatabaseResult<City> {
    let city = sqlx::query_as::<_, City>(&format!(
        "INSERT INTO cities (id, user_id, name, latitude, longitude)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {CITY_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(&city.name)
    .bind(city.latitude)
    .bind(city.longitude)
    .fetch_one(conn)
    .await
    .map_err(DatabaseError::Query)?;

    Ok(city)
}

//! Default city repository: the shared template list

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::{DefaultCity, NewCity};

/// Default city repository
#[derive(Clone)]
pub struct DefaultCityRepository {
    pool: SqlitePool,
}

impl DefaultCityRepository {
    /// Create a new default city repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether no template has been loaded yet
    pub async fn is_empty(&self) -> DatabaseResult<bool> {
        let first: Option<Uuid> = sqlx::query_scalar("SELECT id FROM default_cities LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(first.is_none())
    }

    /// All templates, in the order they were loaded
    pub async fn all(&self) -> DatabaseResult<Vec<DefaultCity>> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::Connection)?;
        all_on(&mut *conn).await
    }

    /// Insert templates in one transaction; a duplicate name aborts the batch
    pub async fn insert_all(&self, cities: &[NewCity]) -> DatabaseResult<usize> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        for city in cities {
            sqlx::query(
                "INSERT INTO default_cities (id, name, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(Uuid::new_v4())
            .bind(&city.name)
            .bind(city.latitude)
            .bind(city.longitude)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;
        }

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(cities.len())
    }
}

/// All templates, read on the given connection
pub async fn all_on(conn: &mut SqliteConnection) -> DatabaseResult<Vec<DefaultCity>> {
    let cities = sqlx::query_as::<_, DefaultCity>(
        "SELECT id, name, latitude, longitude FROM default_cities ORDER BY rowid",
    )
    .fetch_all(conn)
    .await
    .map_err(DatabaseError::Query)?;

    Ok(cities)
}

//! User repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{models::User, seed};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user and give it a copy of the default cities
    ///
    /// Both happen in one transaction. A taken username surfaces as a unique
    /// violation and leaves nothing behind.
    pub async fn register(&self, username: &str, password_hash: &str) -> DatabaseResult<User> {
        info!("Creating new user: {}", username);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let seeded = seed::seed_new_user(&mut *tx, user.id).await?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        info!("User {} registered with {} default cities", user.id, seeded);
        Ok(user)
    }

    /// Find a user by username, ignoring case
    ///
    /// Usernames are unique case-sensitively, so several rows may match; an
    /// exact match wins, then the earliest registered one.
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?1 COLLATE NOCASE
            ORDER BY username = ?1 DESC, rowid
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repositories::{CityRepository, DefaultCityRepository},
        test_support::{city, test_pool},
    };

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_copies_default_cities() {
        let pool = test_pool().await;
        let defaults = DefaultCityRepository::new(pool.clone());
        defaults
            .insert_all(&[city("Madrid", 40.41, -3.7), city("Lisbon", 38.72, -9.13)])
            .await
            .unwrap();

        let users = UserRepository::new(pool.clone());
        let user = users.register("alice", "hash").await.unwrap();

        let cities = CityRepository::new(pool).list_for(user.id).await.unwrap();
        let got: Vec<(String, f64, f64)> = cities
            .iter()
            .map(|c| (c.name.clone(), c.latitude, c.longitude))
            .collect();
        let expected: Vec<(String, f64, f64)> = defaults
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.latitude, c.longitude))
            .collect();

        assert_eq!(got, expected);
        assert!(cities.iter().all(|c| c.temperature.is_none() && c.updated_at.is_none()));
    }

    #[tokio::test]
    async fn test_duplicate_username_has_no_side_effects() {
        let pool = test_pool().await;
        DefaultCityRepository::new(pool.clone())
            .insert_all(&[city("Madrid", 40.41, -3.7)])
            .await
            .unwrap();

        let users = UserRepository::new(pool.clone());
        users.register("alice", "hash").await.unwrap();

        let err = users.register("alice", "other").await.unwrap_err();
        assert!(err.is_unique_violation());

        assert_eq!(count(&pool, "users").await, 1);
        assert_eq!(count(&pool, "cities").await, 1);
    }

    #[tokio::test]
    async fn test_username_uniqueness_is_case_sensitive_lookup_is_not() {
        let pool = test_pool().await;
        let users = UserRepository::new(pool);

        let first = users.register("alice", "h1").await.unwrap();
        let second = users.register("Alice", "h2").await.unwrap();
        assert_ne!(first.id, second.id);

        let found = users.find_by_username("ALICE").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(
            users.find_by_username("Alice").await.unwrap().unwrap().id,
            second.id
        );
        assert!(users.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let pool = test_pool().await;
        let users = UserRepository::new(pool);

        let user = users.register("alice", "hash").await.unwrap();
        let found = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "hash");
        assert!(users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}

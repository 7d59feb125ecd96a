//! City models: per-user cities and the shared default templates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A city on one user's list
///
/// `temperature` and `updated_at` are either both set or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct City {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Template entry copied into every new user's city list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DefaultCity {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// City creation payload, also the row shape of the seed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&DefaultCity> for NewCity {
    fn from(template: &DefaultCity) -> Self {
        Self {
            name: template.name.clone(),
            latitude: template.latitude,
            longitude: template.longitude,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn uuid(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.id)
            .map_err(|_| AppError::InternalError(format!("stored user id '{}' is not a UUID", self.id)))
    }
}

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::guard::{OwnedResource, SoftDeletable},
    errors::{AppError, AppResult},
};

const PATH_BYTES: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub user_id: String, // owner
    pub title: String,
    pub path: String, // public, unguessable handle used in URLs
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn new(user_id: &str, title: &str, path: String) -> Self {
        let now = Utc::now();
        Quiz {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            path,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl SoftDeletable for Quiz {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl OwnedResource for Quiz {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Random URL-safe quiz path (8 bytes, 11 characters).
pub fn generate_path() -> AppResult<String> {
    let mut bytes = [0u8; PATH_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::InternalError(format!("failed to generate quiz path: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::auth::errors::{AuthError, AuthResult};

const TOKEN_BYTES: usize = 32;

/// Persisted session record. Keyed by the SHA-256 of the opaque value the
/// client holds; the value itself is never stored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshToken {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn new(user_id: String, token_hash: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token_hash,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        }
    }

    /// Usable iff not revoked and `now` is before expiry. Revocation is
    /// reported in preference to expiry.
    pub fn check_usable(&self, now: DateTime<Utc>) -> AuthResult<()> {
        if self.revoked_at.is_some() {
            return Err(AuthError::RefreshTokenRevoked);
        }
        if now >= self.expires_at {
            return Err(AuthError::RefreshTokenExpired);
        }
        Ok(())
    }
}

/// Generates a new opaque refresh token value (256 bits, hex encoded).
pub fn generate_token() -> AuthResult<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::HashingError(e.to_string()))?;
    Ok(hex::encode(bytes))
}

pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, RngCore};

use crate::{
    auth::errors::{AuthError, AuthResult},
    config::Config,
};

const DUMMY_PASSWORD: &str = "quizmaker-timing-equalizer";

/// Argon2id cost parameters. Stored hashes embed the parameters they were
/// made with, so raising these never invalidates existing hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl From<&Config> for HashingParams {
    fn from(config: &Config) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// Hashes and verifies user passwords.
pub struct CredentialManager {
    argon2: Argon2<'static>,
    params: HashingParams,
    dummy_hash: String,
}

impl CredentialManager {
    pub fn new(params: HashingParams) -> AuthResult<Self> {
        let argon_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| AuthError::HashingError(format!("invalid Argon2 parameters: {}", e)))?;

        let mut manager = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
            params,
            dummy_hash: String::new(),
        };
        manager.dummy_hash = manager.hash(DUMMY_PASSWORD)?;

        Ok(manager)
    }

    pub fn params(&self) -> HashingParams {
        self.params
    }

    /// Produces a PHC-format Argon2id hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let mut salt_bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// Checks `password` against a stored hash.
    ///
    /// A stored hash that does not parse is reported exactly like a wrong
    /// password, after paying for one full verification.
    pub fn verify(&self, hash: &str, password: &str) -> AuthResult<()> {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .map_err(|_| AuthError::CredentialMismatch),
            Err(_) => {
                self.verify_dummy(password);
                Err(AuthError::CredentialMismatch)
            }
        }
    }

    /// Burns the cost of one verification without checking anything.
    /// Used when there is no stored hash to compare against.
    pub fn verify_dummy(&self, password: &str) {
        if let Ok(parsed) = PasswordHash::new(&self.dummy_hash) {
            let _ = self.argon2.verify_password(password.as_bytes(), &parsed);
        }
    }

    /// True when `hash` was produced with weaker parameters than the current ones.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() < self.params.memory_kib
                    || stored.t_cost() < self.params.iterations
                    || stored.p_cost() < self.params.parallelism
            }
            Err(_) => true,
        }
    }
}

/// Runs Argon2 work on the blocking pool so request workers stay responsive.
pub async fn off_executor<T, F>(credentials: &Arc<CredentialManager>, work: F) -> AuthResult<T>
where
    F: FnOnce(&CredentialManager) -> AuthResult<T> + Send + 'static,
    T: Send + 'static,
{
    let credentials = Arc::clone(credentials);
    tokio::task::spawn_blocking(move || work(&credentials))
        .await
        .map_err(|e| AuthError::HashingError(format!("hashing task failed: {}", e)))?
}

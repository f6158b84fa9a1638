use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_days: i64,
    pub store_timeout_secs: u64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "quizmaker-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: parse_var("WEB_SERVER_PORT", 8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            ),
            access_token_ttl_hours: parse_var("ACCESS_TOKEN_TTL_HOURS", 24),
            refresh_token_ttl_days: parse_var("REFRESH_TOKEN_TTL_DAYS", 30),
            store_timeout_secs: parse_var("STORE_TIMEOUT_SECS", 5),
            // OWASP baseline for Argon2id
            argon2_memory_kib: parse_var("ARGON2_MEMORY_KIB", 19_456),
            argon2_iterations: parse_var("ARGON2_ITERATIONS", 2),
            argon2_parallelism: parse_var("ARGON2_PARALLELISM", 1),
        }
    }

    pub fn access_token_ttl(&self) -> AppResult<chrono::Duration> {
        token_lifetime(
            "ACCESS_TOKEN_TTL_HOURS",
            self.access_token_ttl_hours,
            chrono::Duration::try_hours,
        )
    }

    pub fn refresh_token_ttl(&self) -> AppResult<chrono::Duration> {
        token_lifetime(
            "REFRESH_TOKEN_TTL_DAYS",
            self.refresh_token_ttl_days,
            chrono::Duration::try_days,
        )
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Rejects configuration that must never reach a deployed server:
    /// the development signing secret, or a secret shorter than 32 bytes.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the development default; set it to a secure random string"
                    .to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}); it must be at least 32 characters",
                jwt_secret.len()
            )));
        }

        self.access_token_ttl()?;
        self.refresh_token_ttl()?;

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizmaker-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            access_token_ttl_hours: 24,
            refresh_token_ttl_days: 30,
            store_timeout_secs: 5,
            // cheap parameters keep the test suite fast
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        }
    }
}

fn token_lifetime(
    name: &str,
    amount: i64,
    to_duration: fn(i64) -> Option<chrono::Duration>,
) -> AppResult<chrono::Duration> {
    match to_duration(amount) {
        Some(ttl) if amount > 0 => Ok(ttl),
        _ => Err(AppError::InternalError(format!(
            "{} must be a positive lifetime within range, got {}",
            name, amount
        ))),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

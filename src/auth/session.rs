use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    auth::{
        errors::AuthError,
        jwt::AccessTokenCodec,
        password::{off_executor, CredentialManager},
    },
    db::with_deadline,
    errors::{AppError, AppResult},
    models::domain::{
        refresh_token::{generate_token, hash_token},
        RefreshToken, User,
    },
    repositories::{RefreshTokenRepository, UserRepository},
};

/// A freshly signed access token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_in: i64,
}

/// Everything handed back to a client on a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: IssuedAccessToken,
    pub refresh_token: String,
    pub refresh_expires_in: i64,
}

/// Trims and lowercases an email so lookups and uniqueness ignore case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Owns the login, refresh, revoke and password-change flows.
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    credentials: Arc<CredentialManager>,
    codec: Arc<AccessTokenCodec>,
    refresh_ttl: Duration,
    store_timeout: StdDuration,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        credentials: Arc<CredentialManager>,
        codec: Arc<AccessTokenCodec>,
        refresh_ttl: Duration,
        store_timeout: StdDuration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            credentials,
            codec,
            refresh_ttl,
            store_timeout,
        }
    }

    /// Exchanges an email and password for an access token plus a stored
    /// refresh token. Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginSession> {
        let email = normalize_email(email);
        let found = with_deadline(self.store_timeout, self.users.find_by_email(&email)).await?;

        let Some(user) = found else {
            let password = password.to_string();
            off_executor(&self.credentials, move |c| {
                c.verify_dummy(&password);
                Ok(())
            })
            .await?;
            log::debug!("login rejected: no account for the supplied email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let stored_hash = user.password_hash.clone();
        let attempt = password.to_string();
        if off_executor(&self.credentials, move |c| c.verify(&stored_hash, &attempt))
            .await
            .is_err()
        {
            log::debug!("login rejected for user {}: password mismatch", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        self.upgrade_hash_if_weak(&user, password).await;

        let access_token = self.issue_access_token(user.uuid()?)?;
        let refresh_token = generate_token()?;
        let record = RefreshToken::new(
            user.id.clone(),
            hash_token(&refresh_token),
            Utc::now(),
            self.refresh_ttl,
        );
        with_deadline(self.store_timeout, self.refresh_tokens.create(record)).await?;

        log::info!("User {} logged in", user.id);
        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
            refresh_expires_in: self.refresh_ttl.num_seconds(),
        })
    }

    /// Mints a new access token from a stored, live refresh token. The
    /// refresh token itself is left untouched.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedAccessToken> {
        let record = with_deadline(
            self.store_timeout,
            self.refresh_tokens.find_by_token_hash(&hash_token(refresh_token)),
        )
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        record.check_usable(Utc::now())?;

        let user_id = Uuid::parse_str(&record.user_id).map_err(|_| {
            AppError::InternalError(format!(
                "refresh token owner '{}' is not a UUID",
                record.user_id
            ))
        })?;
        self.issue_access_token(user_id)
    }

    /// Marks a refresh token revoked. Revoking twice is allowed and moves
    /// the revocation time forward.
    pub async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        with_deadline(
            self.store_timeout,
            self.refresh_tokens
                .revoke_by_token_hash(&hash_token(refresh_token), Utc::now()),
        )
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("Refresh token not found".to_string()),
            other => other,
        })?;

        log::info!("Refresh token revoked");
        Ok(())
    }

    /// Replaces the caller's password after re-checking the current one,
    /// then revokes every refresh token they hold.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let id = user_id.to_string();
        let user = with_deadline(self.store_timeout, self.users.find_by_id(&id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;

        let stored_hash = user.password_hash.clone();
        let attempt = current_password.to_string();
        off_executor(&self.credentials, move |c| c.verify(&stored_hash, &attempt))
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        let replacement = new_password.to_string();
        let new_hash = off_executor(&self.credentials, move |c| c.hash(&replacement)).await?;

        // Sessions go first so a failed revoke leaves the old password in place.
        let now = Utc::now();
        let revoked = with_deadline(
            self.store_timeout,
            self.refresh_tokens.revoke_all_for_user(&id, now),
        )
        .await?;
        with_deadline(
            self.store_timeout,
            self.users.update_password(&id, &new_hash, now),
        )
        .await?;

        log::info!(
            "User {} changed password; revoked {} refresh token(s)",
            id,
            revoked
        );
        Ok(())
    }

    fn issue_access_token(&self, user_id: Uuid) -> AppResult<IssuedAccessToken> {
        Ok(IssuedAccessToken {
            token: self.codec.issue(user_id)?,
            expires_in: self.codec.ttl().num_seconds(),
        })
    }

    /// Best effort: a failed rehash never fails the login.
    async fn upgrade_hash_if_weak(&self, user: &User, password: &str) {
        if !self.credentials.needs_rehash(&user.password_hash) {
            return;
        }

        let password = password.to_string();
        let rehashed = match off_executor(&self.credentials, move |c| c.hash(&password)).await {
            Ok(hash) => hash,
            Err(e) => {
                log::warn!("Could not rehash password for user {}: {}", user.id, e);
                return;
            }
        };

        match with_deadline(
            self.store_timeout,
            self.users.update_password(&user.id, &rehashed, Utc::now()),
        )
        .await
        {
            Ok(()) => log::info!("Upgraded password hash for user {}", user.id),
            Err(e) => log::warn!("Could not store rehashed password for user {}: {}", user.id, e),
        }
    }
}

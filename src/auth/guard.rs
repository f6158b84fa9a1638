use std::sync::Arc;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{
    errors::{AuthError, AuthResult},
    jwt::AccessTokenCodec,
};

const BEARER_PREFIX: &str = "Bearer ";

/// A record that is soft-deleted by stamping `deleted_at`.
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
}

/// A record with a single owning user.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
/// The scheme is matched case-sensitively, with exactly one space before a
/// token that itself holds no whitespace.
pub fn extract_bearer(headers: &HeaderMap) -> AuthResult<&str> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MissingCredentials)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

pub fn authorize_ownership(user_id: &Uuid, owner_id: &str) -> AuthResult<()> {
    if user_id.to_string() != owner_id {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

pub fn check_not_deleted<R: SoftDeletable + ?Sized>(resource: &R) -> AuthResult<()> {
    if resource.deleted_at().is_some() {
        return Err(AuthError::Gone);
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthorizationGuard {
    codec: Arc<AccessTokenCodec>,
}

impl AuthorizationGuard {
    pub fn new(codec: Arc<AccessTokenCodec>) -> Self {
        Self { codec }
    }

    /// Recovers the caller's identity from their access token.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Uuid> {
        let token = extract_bearer(headers)?;
        self.codec.validate(token)
    }

    /// The gate in front of every mutation of an already resolved resource:
    /// not deleted, then authenticated, then owned by the caller.
    pub fn authorize_mutation<R>(&self, headers: &HeaderMap, resource: &R) -> AuthResult<Uuid>
    where
        R: SoftDeletable + OwnedResource,
    {
        check_not_deleted(resource)?;
        let user_id = self.authenticate(headers)?;
        authorize_ownership(&user_id, resource.owner_id())?;
        Ok(user_id)
    }
}

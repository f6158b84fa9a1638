use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    auth::guard::extract_bearer,
    errors::AppError,
};

/// Extractor for the caller behind a valid access token.
pub struct AuthenticatedUser(pub Uuid);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state
                .guard
                .authenticate(req.headers())
                .map(AuthenticatedUser)
                .map_err(AppError::from),
            None => Err(AppError::InternalError(
                "application state not configured".to_string(),
            )),
        };

        ready(result)
    }
}

/// Raw bearer credential, unvalidated. Refresh and revoke carry the opaque
/// refresh token this way.
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            extract_bearer(req.headers())
                .map(|token| BearerToken(token.to_string()))
                .map_err(AppError::from),
        )
    }
}

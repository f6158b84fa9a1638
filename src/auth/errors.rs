use actix_web::http::StatusCode;
use thiserror::Error;

/// Failures of the authentication and authorization subsystem.
///
/// Everything that maps to 401 is rendered with one uniform response body by
/// [`crate::errors::AppError`]; the variant is only visible in logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    HashingError(String),

    #[error("token signing failed: {0}")]
    SigningError(String),

    #[error("credential mismatch")]
    CredentialMismatch,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing or malformed authorization header")]
    MissingCredentials,

    #[error("malformed token")]
    MalformedToken,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    #[error("token algorithm rejected")]
    AlgorithmRejected,

    #[error("token subject is not a user id")]
    MalformedSubject,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("refresh token has expired")]
    RefreshTokenExpired,

    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,

    #[error("you do not have permission to modify this resource")]
    Forbidden,

    #[error("resource has been deleted")]
    Gone,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::HashingError(_) | AuthError::SigningError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Gone => StatusCode::GONE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

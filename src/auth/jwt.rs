use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{
    claims::{AccessClaims, ACCESS_TOKEN_ISSUER},
    errors::{AuthError, AuthResult},
};

const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl AccessTokenCodec {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false;
        // expiry is checked against an explicit clock in validate_at
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid) -> AuthResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AuthResult<String> {
        let claims = AccessClaims::new(user_id, now, self.ttl);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> AuthResult<Uuid> {
        self.validate_at(token, Utc::now())
    }

    /// Validates `token` as of `now` and returns the user id it was issued to.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Uuid> {
        // Inspect the declared algorithm ourselves so that headers the
        // library cannot even represent (`none`) are still reported as such.
        if declared_algorithm(token)? != ALGORITHM_NAME {
            return Err(AuthError::AlgorithmRejected);
        }

        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                ErrorKind::InvalidAlgorithm => AuthError::AlgorithmRejected,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken,
            })?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedSubject)
    }
}

fn declared_algorithm(token: &str) -> AuthResult<String> {
    let header_segment = token.split('.').next().ok_or(AuthError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|_| AuthError::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;

    Ok(header.alg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn codec() -> AccessTokenCodec {
        let config = Config::test_config();
        AccessTokenCodec::new(&config.jwt_secret, Duration::hours(24))
    }

    fn segment(value: serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(value.to_string())
    }

    #[test]
    fn test_issue_and_validate() {
        let codec = codec();
        let user_id = Uuid::new_v4();

        let token = codec.issue(user_id).unwrap();

        assert_eq!(codec.validate(&token), Ok(user_id));
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now();
        let token = codec.issue_at(user_id, issued_at).unwrap();

        let just_before = issued_at + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(codec.validate_at(&token, just_before), Ok(user_id));

        let at_expiry = issued_at + Duration::hours(24);
        assert_eq!(codec.validate_at(&token, at_expiry), Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = codec().issue(Uuid::new_v4()).unwrap();
        let other = AccessTokenCodec::new(
            &SecretString::from("another_secret".to_string()),
            Duration::hours(24),
        );

        assert_eq!(other.validate(&token), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let config = Config::test_config();
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: Uuid::new_v4().to_string(),
            iss: "refresh".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().validate(&token), Err(AuthError::IssuerMismatch));
    }

    #[test]
    fn test_other_hmac_algorithm_is_rejected() {
        let config = Config::test_config();
        let claims = AccessClaims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().validate(&token), Err(AuthError::AlgorithmRejected));
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let now = Utc::now().timestamp();
        let token = format!(
            "{}.{}.",
            segment(serde_json::json!({ "alg": "none", "typ": "JWT" })),
            segment(serde_json::json!({
                "sub": Uuid::new_v4().to_string(),
                "iss": "access",
                "iat": now,
                "exp": now + 3600,
            })),
        );

        assert_eq!(codec().validate(&token), Err(AuthError::AlgorithmRejected));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();

        assert_eq!(codec.validate("invalid.token.here"), Err(AuthError::MalformedToken));
        assert_eq!(codec.validate(""), Err(AuthError::MalformedToken));

        let header_only = format!("{}.", segment(serde_json::json!({ "alg": "HS256" })));
        assert_eq!(codec.validate(&header_only), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let config = Config::test_config();
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: "johndoe".to_string(),
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().validate(&token), Err(AuthError::MalformedSubject));
    }
}

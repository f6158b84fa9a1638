pub mod claims;
pub mod errors;
pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod session;

pub use claims::AccessClaims;
pub use errors::{AuthError, AuthResult};
pub use extractor::{AuthenticatedUser, BearerToken};
pub use guard::{AuthorizationGuard, OwnedResource, SoftDeletable};
pub use jwt::AccessTokenCodec;
pub use password::{CredentialManager, HashingParams};
pub use session::{IssuedAccessToken, LoginSession, SessionManager};

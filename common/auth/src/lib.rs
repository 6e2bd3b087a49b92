pub mod claims;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod issuer;
pub mod middleware;
pub mod verifier;

pub use claims::{Identity, NAME_CLAIM};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::JwtConfig;
pub use credentials::{CredentialStore, StaticCredentialStore, DEFAULT_PASSWORD, DEFAULT_USERNAME};
pub use error::{AuthError, AuthResult, ConfigError};
pub use extractors::{authenticate, AuthContext};
pub use guards::{ensure_authorized, AllowAuthenticated, AllowNames, AuthorizationPolicy};
pub use issuer::{IssuedToken, TokenIssuer};
pub use middleware::{require_bearer, require_policy};
pub use verifier::JwtVerifier;

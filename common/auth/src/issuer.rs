use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::{debug, warn};

use crate::claims::TokenClaims;
use crate::clock::{Clock, SystemClock};
use crate::config::JwtConfig;
use crate::credentials::CredentialStore;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints HS256 tokens for callers that pass the credential check.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<JwtConfig>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: Arc<JwtConfig>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            credentials,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Validate the credential pair and mint a token for `username`.
    ///
    /// A mismatch yields [`AuthError::InvalidCredentials`] and nothing else.
    pub async fn issue(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        if !self.credentials.validate(username, password).await {
            warn!("login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        self.mint(username)
    }

    /// Sign a token for `name` without consulting the credential store.
    pub fn mint(&self, name: &str) -> AuthResult<IssuedToken> {
        let now = self.clock.now();
        let expires = now
            .checked_add_signed(self.config.token_ttl)
            .ok_or_else(|| AuthError::Signing(format!("token lifetime overflows from {now}")))?;
        let exp = expires.timestamp();

        let claims = TokenClaims {
            unique_name: name,
            exp,
            iss: &self.config.issuer,
            aud: &self.config.audience,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret()),
        )
        .map_err(|err| AuthError::Signing(err.to_string()))?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| AuthError::Signing(format!("expiry out of range: {exp}")))?;

        debug!(%expires_at, "issued JWT");
        Ok(IssuedToken { token, expires_at })
    }
}

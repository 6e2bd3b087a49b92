use std::fmt;

use chrono::Duration;

use crate::error::ConfigError;

/// Default lifetime of an issued access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Runtime configuration shared by token issuance and verification.
#[derive(Clone)]
pub struct JwtConfig {
    key: String,
    /// Expected issuer claim (iss).
    pub issuer: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Lifetime applied to newly minted tokens.
    pub token_ttl: Duration,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Construct config with a 30 minute token lifetime and no leeway.
    ///
    /// Every value must be non-empty; the service refuses to start otherwise.
    pub fn new(
        key: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if key.is_empty() {
            return Err(ConfigError::Missing("key"));
        }
        if issuer.is_empty() {
            return Err(ConfigError::Missing("issuer"));
        }
        if audience.is_empty() {
            return Err(ConfigError::Missing("audience"));
        }

        Ok(Self {
            key,
            issuer,
            audience,
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            leeway_seconds: 0,
        })
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Adjust the lifetime of minted tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Shared HMAC secret as raw bytes.
    pub fn secret(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl", &self.token_ttl)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

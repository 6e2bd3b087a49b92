use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Identity;
use crate::clock::{Clock, SystemClock};
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};

/// Checks signature, issuer, audience and expiry of presented tokens.
#[derive(Clone)]
pub struct JwtVerifier {
    config: Arc<JwtConfig>,
    clock: Arc<dyn Clock>,
}

impl JwtVerifier {
    pub fn new(config: Arc<JwtConfig>) -> Self {
        Self {
            config,
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

    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let header = decode_header(token).map_err(|err| AuthError::Malformed(err.to_string()))?;
        if header.alg != Algorithm::HS256 {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        // Expiry is checked against the injected clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.validate_exp = false;

        let key = DecodingKey::from_secret(self.config.secret());
        let token_data = decode::<Value>(token, &key, &validation)?;
        let identity = Identity::try_from(token_data.claims)?;

        let leeway = Duration::seconds(self.config.leeway_seconds.into());
        let deadline = identity
            .expires_at
            .checked_add_signed(leeway)
            .ok_or_else(|| {
                AuthError::InvalidClaim("exp", identity.expires_at.timestamp().to_string())
            })?;
        if self.clock.now() >= deadline {
            return Err(AuthError::Expired);
        }

        debug!(identity = %identity.name, "verified JWT successfully");
        Ok(identity)
    }
}

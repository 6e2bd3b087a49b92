use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue};

use crate::claims::Identity;
use crate::error::{AuthError, AuthResult};
use crate::verifier::JwtVerifier;

/// Verified identity for the current request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub token: String,
}

impl AuthContext {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

/// Verify the bearer token carried in `headers`.
pub fn authenticate(verifier: &JwtVerifier, headers: &HeaderMap) -> AuthResult<AuthContext> {
    let header_value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let token = parse_bearer(header_value)?;
    let identity = verifier.verify(&token)?;

    Ok(AuthContext { identity, token })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Reuse the identity attached by `require_bearer` when present.
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(context.clone());
        }

        let verifier = Arc::<JwtVerifier>::from_ref(state);
        authenticate(&verifier, &parts.headers)
    }
}

fn parse_bearer(value: &HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let (scheme, token) = raw
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthorization)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthorization);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}

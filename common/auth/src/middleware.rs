//! Request interceptors for protected routes.
//!
//! Each interceptor either forwards the request to the next layer or
//! short-circuits with a rejection, so they compose with `route_layer`:
//!
//! ```ignore
//! Router::new()
//!     .route("/api/secure/data", get(handler))
//!     .route_layer(from_fn_with_state(policy, require_policy))
//!     .route_layer(from_fn_with_state(verifier, require_bearer));
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::AuthError;
use crate::extractors::{authenticate, AuthContext};
use crate::guards::{ensure_authorized, AuthorizationPolicy};
use crate::verifier::JwtVerifier;

/// Verify the bearer token and attach the [`AuthContext`] to the request.
pub async fn require_bearer(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&verifier, request.headers()) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => {
            debug!(error = %err, path = %request.uri().path(), "rejected bearer token");
            err.into_response()
        }
    }
}

/// Evaluate the policy against the identity attached by [`require_bearer`].
pub async fn require_policy(
    State(policy): State<Arc<dyn AuthorizationPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(context) = request.extensions().get::<AuthContext>() else {
        return AuthError::MissingAuthorization.into_response();
    };

    match ensure_authorized(context, policy.as_ref()) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

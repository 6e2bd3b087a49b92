use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::{AuthContext, AuthError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::AppState;

pub const SECURED_DATA: &str = "This is secured data";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SecureDataResponse {
    pub data: &'static str,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Unable to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    match state
        .token_issuer
        .issue(&request.username, &request.password)
        .await
    {
        Ok(issued) => {
            state.record_login_metric("success");
            info!(expires_at = %issued.expires_at, "issued access token");
            Ok(Json(LoginResponse {
                token: issued.token,
            }))
        }
        Err(err @ AuthError::InvalidCredentials) => {
            state.record_login_metric("invalid_credentials");
            Err(err)
        }
        Err(err) => {
            state.record_login_metric("error");
            error!(error = %err, "Failed to issue access token");
            Err(err)
        }
    }
}

pub async fn secure_data(auth: AuthContext) -> Json<SecureDataResponse> {
    debug!(identity = %auth.name(), "serving secured data");
    Json(SecureDataResponse { data: SECURED_DATA })
}

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use common_auth::{
    require_bearer, require_policy, AllowAuthenticated, AuthorizationPolicy, Clock,
    CredentialStore, JwtConfig, JwtVerifier, StaticCredentialStore, SystemClock, TokenIssuer,
};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::handlers::{health, login, metrics_endpoint, secure_data};
use crate::metrics::{track_token_verifications, ApiMetrics};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Option<MySqlPool>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub token_issuer: Arc<TokenIssuer>,
    pub policy: Arc<dyn AuthorizationPolicy>,
    pub metrics: Arc<ApiMetrics>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.token_issuer.clone()
    }
}

impl FromRef<AppState> for Arc<ApiMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl AppState {
    /// Wire issuer and verifier around one shared config and clock.
    pub fn new(
        jwt: JwtConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let jwt = Arc::new(jwt);
        let token_issuer = TokenIssuer::new(jwt.clone(), credentials).with_clock(clock.clone());
        let jwt_verifier = JwtVerifier::new(jwt).with_clock(clock);

        Ok(Self {
            db: None,
            jwt_verifier: Arc::new(jwt_verifier),
            token_issuer: Arc::new(token_issuer),
            policy: Arc::new(AllowAuthenticated),
            metrics: Arc::new(ApiMetrics::new()?),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let credentials = StaticCredentialStore::new(
            config.login_username.clone(),
            config.login_password.clone(),
        );
        let mut state = Self::new(
            config.jwt.clone(),
            Arc::new(credentials),
            Arc::new(SystemClock),
        )?;

        match &config.database_url {
            Some(url) => {
                // Connections are opened on first use.
                let pool = MySqlPoolOptions::new()
                    .max_connections(5)
                    .connect_lazy(url)
                    .context("Invalid DATABASE_URL")?;
                info!("database pool configured");
                state = state.with_db(pool);
            }
            None => warn!("DATABASE_URL not set; running without a database pool"),
        }

        Ok(state)
    }

    pub fn with_db(mut self, pool: MySqlPool) -> Self {
        self.db = Some(pool);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.login_attempt(outcome);
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/secure/data", get(secure_data))
        .route_layer(from_fn_with_state(state.policy.clone(), require_policy))
        .route_layer(from_fn_with_state(
            state.jwt_verifier.clone(),
            require_bearer,
        ))
        .route_layer(from_fn_with_state(
            state.metrics.clone(),
            track_token_verifications,
        ));

    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(%origin, error = %err, "ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
}

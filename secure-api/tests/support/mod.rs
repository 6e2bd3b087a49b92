#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Request};
use axum::response::Response;
use axum::Router;
use common_auth::{JwtConfig, ManualClock, StaticCredentialStore};
use http_body_util::BodyExt;
use secure_api::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-key";
pub const TEST_ISSUER: &str = "test-issuer";
pub const TEST_AUDIENCE: &str = "test-audience";

pub struct TestApp {
    pub clock: ManualClock,
    pub state: AppState,
    pub router: Router,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE).expect("jwt config")
}

pub fn test_state(clock: &ManualClock) -> Result<AppState> {
    AppState::new(
        jwt_config(),
        Arc::new(StaticCredentialStore::default()),
        Arc::new(clock.clone()),
    )
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let clock = ManualClock::default();
        let state = test_state(&clock)?;
        Ok(Self::from_state(clock, state))
    }

    pub fn from_state(clock: ManualClock, state: AppState) -> Self {
        let router = build_router(state.clone());
        Self {
            clock,
            state,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        let body = json!({ "username": username, "password": password });
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    pub async fn secure_data(&self, token: Option<&str>) -> Result<Response> {
        let mut builder = Request::builder().uri("/api/secure/data");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty())?).await
    }
}

pub async fn body_bytes(response: Response) -> Result<Vec<u8>> {
    Ok(response.into_body().collect().await?.to_bytes().to_vec())
}

pub async fn body_json(response: Response) -> Result<Value> {
    Ok(serde_json::from_slice(&body_bytes(response).await?)?)
}

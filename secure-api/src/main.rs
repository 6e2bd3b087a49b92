use anyhow::Context;
use secure_api::{build_router, cors_layer, load_api_config, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_api_config().context("Failed to load configuration")?;
    let state = AppState::from_config(&config)?;

    let app = build_router(state).layer(cors_layer(&config.allowed_origins));

    let addr = config.socket_addr()?;
    info!(%addr, "starting secure-api");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

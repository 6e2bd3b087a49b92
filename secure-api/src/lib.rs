pub mod app;
pub mod config;
pub mod handlers;
pub mod metrics;

pub use app::{build_router, cors_layer, AppState};
pub use config::{load_api_config, load_api_config_from, ApiConfig};

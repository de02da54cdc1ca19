mod analysis;
mod config;
mod errors;
mod model_client;
mod quota;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::model_client::GeminiClient;
use crate::quota::{MemoryQuotaStore, QuotaStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FitScan API v{}", env!("CARGO_PKG_VERSION"));

    // Admission store plus its periodic sweep
    let quota: Arc<dyn QuotaStore> = Arc::new(MemoryQuotaStore::new(
        config.rate_limit_ceiling,
        config.rate_limit_window,
    ));
    quota::spawn_sweeper(Arc::clone(&quota), config.rate_limit_sweep_interval);
    info!(
        "Admission control: {} requests per {:?}, sweep every {:?}",
        config.rate_limit_ceiling, config.rate_limit_window, config.rate_limit_sweep_interval
    );

    // Model client (credential arrives per-request, not from the env)
    let model = GeminiClient::new();
    info!("Gemini client initialized (model: {})", model_client::MODEL);

    let state = AppState {
        quota,
        model,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

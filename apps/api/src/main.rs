mod chart;
mod config;
mod ephemeris;
mod errors;
mod geo;
mod interpret;
mod llm;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BackendKind, Config};
use crate::ephemeris::meeus::MeeusEphemeris;
use crate::geo::timezone::TzfTimezoneLookup;
use crate::geo::NominatimGeocoder;
use crate::interpret::logbook::GenerationLog;
use crate::llm::{local::LocalBackend, remote::RemoteBackend, GenerationBackend};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AstroVars API v{}", env!("CARGO_PKG_VERSION"));

    // Timezone-boundary index — expensive to build, so build it exactly once
    let timezones = Arc::new(TzfTimezoneLookup::new());
    info!("Timezone index loaded");

    // Geocoder
    let geocoder = Arc::new(NominatimGeocoder::new(config.geocoder_base_url.clone()));
    info!("Geocoder initialized ({})", config.geocoder_base_url);

    // Built-in ephemeris backend
    let ephemeris = Arc::new(MeeusEphemeris);

    // Generation backend, selected by configuration
    let generator: Arc<dyn GenerationBackend> = match config.backend {
        BackendKind::Remote => Arc::new(RemoteBackend::new(
            config.llm_api_base.clone(),
            config
                .llm_api_key
                .clone()
                .expect("Config::from_env requires LLM_API_KEY for the remote backend"),
            config.llm_model.clone(),
        )),
        BackendKind::Local => Arc::new(LocalBackend::new(
            config.llm_api_base.clone(),
            config.llm_model.clone(),
        )),
    };
    info!(
        "Generation backend initialized ({}, model: {})",
        generator.name(),
        config.llm_model
    );

    // Generation logbook (optional)
    let log = GenerationLog::new(config.generation_log_path.clone());
    if log.is_enabled() {
        info!("Generation logbook enabled");
    }

    // Build app state
    let state = AppState {
        geocoder,
        timezones,
        ephemeris,
        generator,
        log,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

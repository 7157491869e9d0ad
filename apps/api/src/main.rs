mod config;
mod errors;
mod extraction;
mod llm_client;
mod parsing;
mod rendering;
mod routes;
mod state;
mod tailoring;
mod workflow;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, Severity};
use crate::llm_client::GeminiClient;
use crate::rendering::DocumentRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::TailoringClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config);

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    let issues = config.validate_for_startup();
    for issue in &issues {
        match issue.severity {
            Severity::Critical => error!("Configuration: {}", issue.message),
            Severity::Warning => warn!("Configuration: {}", issue.message),
        }
    }
    if issues.iter().any(|i| i.severity == Severity::Critical) {
        bail!("configuration has critical issues; refusing to start");
    }

    let renderer = DocumentRenderer::new(&config.output_dir)?;

    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("Generation client initialized (model: {})", config.gemini_model);
    let tailoring = TailoringClient::new(Arc::new(gemini));

    let state = AppState {
        config: config.clone(),
        renderer,
        tailoring,
    };

    // Permissive CORS: the browser extension calls from its own origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise the configured level (debug when DEBUG is on).
fn init_tracing(config: &Config) {
    let level = if config.debug { "debug" } else { config.rust_log.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level},tower_http={level}", env!("CARGO_CRATE_NAME"))));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

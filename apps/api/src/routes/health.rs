use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// `healthy` when the base résumé exists and the generation service is
/// configured, `degraded` otherwise. Always 200 so probes can read the body.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let resume_ok = state.config.resume_exists();
    let gemini_ok = state.config.gemini_configured();
    let output_ok = state.renderer.output_dir().is_dir();

    let status = if resume_ok && gemini_ok && output_ok {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": Utc::now().to_rfc3339(),
        "checks": {
            "resume_file": resume_ok,
            "gemini_configured": gemini_ok,
            "output_dir": output_ok,
        }
    }))
}

/// GET /config
/// Non-sensitive settings only; the API key is reported as configured or not.
pub async fn config_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "gemini_model": state.tailoring.model(),
        "gemini_configured": config.gemini_configured(),
        "resume_dir": config.resume_dir.display().to_string(),
        "resume_filename": config.resume_filename,
        "resume_exists": config.resume_exists(),
        "output_dir": config.output_dir.display().to_string(),
        "keep_files": config.keep_files,
        "debug": config.debug,
    }))
}

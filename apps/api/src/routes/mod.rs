pub mod handlers;
pub mod health;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::errors::attach_error_chain;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/config", get(health::config_handler))
        // Résumé
        .route("/resume/info", get(handlers::handle_resume_info))
        .route("/resume/parse", get(handlers::handle_resume_parse))
        // Tailoring
        .route("/tailor", post(handlers::handle_tailor))
        .route("/job/extract", post(handlers::handle_job_extract))
        .route("/gemini/test", get(handlers::handle_gemini_test))
        // Generated files
        .route("/download/:filename", get(handlers::handle_download))
        .route("/files", get(handlers::handle_list_files))
        .route("/files/cleanup", delete(handlers::handle_cleanup))
        .layer(from_fn_with_state(state.config.debug, attach_error_chain))
        .with_state(state)
}

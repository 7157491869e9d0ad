use crate::config::Config;
use crate::rendering::DocumentRenderer;
use crate::tailoring::TailoringClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub renderer: DocumentRenderer,
    /// Wraps an `Arc<dyn TextGenerator>`; Gemini in production, canned in tests.
    pub tailoring: TailoringClient,
}

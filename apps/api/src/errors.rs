use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;

use crate::extraction::ExtractError;
use crate::llm_client::LlmError;
use crate::parsing::ParseError;
use crate::rendering::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resume file not found: {}", path.display())]
    ResumeNotFound { path: PathBuf },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {format}. Supported: {supported}")]
    UnsupportedFormat {
        format: String,
        supported: &'static str,
    },

    #[error("Failed to parse resume {filename}: {reason}")]
    ResumeParse {
        filename: String,
        format: Option<String>,
        reason: String,
    },

    #[error("Generation service error: {0}")]
    Generation(#[source] LlmError),

    #[error("Generation service rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Document generation failed: {0}")]
    DocumentGeneration(#[source] RenderError),

    #[error("Invalid job description: {0}")]
    InvalidJobDescription(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Maps a résumé parse failure, attaching the file it came from.
    pub fn from_parse(err: ParseError, filename: &str) -> Self {
        match err {
            ParseError::NotFound(path) => AppError::ResumeNotFound { path },
            ParseError::Io { source, .. } => AppError::ResumeParse {
                filename: filename.to_string(),
                format: None,
                reason: source.to_string(),
            },
            ParseError::Extract(ExtractError::UnsupportedFormat(format)) => {
                AppError::UnsupportedFormat {
                    format,
                    supported: "pdf, docx, doc",
                }
            }
            ParseError::Extract(ExtractError::Extraction { format, reason }) => {
                AppError::ResumeParse {
                    filename: filename.to_string(),
                    format: Some(format.to_string()),
                    reason,
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ResumeNotFound { .. } | AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedFormat { .. }
            | AppError::InvalidJobDescription(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ResumeParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::DocumentGeneration(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ResumeNotFound { .. } => "RESUME_NOT_FOUND",
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AppError::ResumeParse { .. } => "RESUME_PARSE_ERROR",
            AppError::Generation(_) => "GENERATION_SERVICE_ERROR",
            AppError::RateLimited(_) => "GENERATION_RATE_LIMIT",
            AppError::DocumentGeneration(_) => "DOCUMENT_GENERATION_ERROR",
            AppError::InvalidJobDescription(_) => "INVALID_JOB_DESCRIPTION",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Actionable fields for the response body.
    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::ResumeNotFound { path } => Some(json!({ "path": path.display().to_string() })),
            AppError::FileNotFound(filename) => Some(json!({ "filename": filename })),
            AppError::UnsupportedFormat { format, supported } => {
                Some(json!({ "format": format, "supported": supported }))
            }
            AppError::ResumeParse {
                filename,
                format,
                reason,
            } => Some(json!({ "filename": filename, "format": format, "reason": reason })),
            AppError::DocumentGeneration(RenderError::Io { path, .. }) => {
                Some(json!({ "path": path.display().to_string() }))
            }
            AppError::DocumentGeneration(RenderError::Pdf(reason)) => {
                Some(json!({ "format": "pdf", "reason": reason }))
            }
            AppError::DocumentGeneration(RenderError::Docx(reason)) => {
                Some(json!({ "format": "docx", "reason": reason }))
            }
            _ => None,
        }
    }

    /// What the client sees. Internal failures get a generic message.
    fn public_message(&self) -> String {
        match self {
            AppError::Generation(_) => {
                "The generation service is currently unavailable. Please try again later."
                    .to_string()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnsupportedFormat(format) => AppError::UnsupportedFormat {
                format,
                supported: "pdf, docx",
            },
            other => AppError::DocumentGeneration(other),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited(message) => AppError::RateLimited(message),
            other => AppError::Generation(other),
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// Error payload and cause chain, stashed on the response so
/// [`attach_error_chain`] can re-render it with the chain when `DEBUG` is set.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    payload: Value,
    chain: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{self:?}");
        } else {
            tracing::warn!(code = self.code(), "{self}");
        }

        let payload = json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
                "details": self.details(),
                "timestamp": Utc::now().to_rfc3339(),
            }
        });
        let chain = match &self {
            AppError::Internal(e) => e.chain().map(|c| c.to_string()).collect(),
            other => error_chain(other),
        };

        let mut response = (status, Json(payload.clone())).into_response();
        response.extensions_mut().insert(ErrorReport { payload, chain });
        response
    }
}

/// Middleware: with `debug` on, error responses carry their cause chain under
/// `error.details.debug`. With it off they pass through untouched.
pub async fn attach_error_chain(State(debug): State<bool>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if !debug {
        return response;
    }
    let Some(ErrorReport { mut payload, chain }) = response.extensions().get::<ErrorReport>().cloned()
    else {
        return response;
    };

    if let Some(error) = payload.get_mut("error") {
        let details = &mut error["details"];
        if !details.is_object() {
            *details = json!({});
        }
        details["debug"] = json!(chain);
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(payload.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::extraction::DocumentFormat;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_failure_maps_to_422_with_details() {
        let err = AppError::from_parse(
            ParseError::Extract(ExtractError::extraction(DocumentFormat::Pdf, "encrypted")),
            "cv.pdf",
        );
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "RESUME_PARSE_ERROR");
        assert_eq!(body["error"]["details"]["filename"], "cv.pdf");
        assert_eq!(body["error"]["details"]["format"], "pdf");
        assert!(body["error"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_generation_errors_map_to_503_and_429() {
        let (status, body) = body_json(LlmError::EmptyContent.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "GENERATION_SERVICE_ERROR");

        let (status, body) = body_json(LlmError::RateLimited("quota".into()).into()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "GENERATION_RATE_LIMIT");
    }

    #[test]
    fn test_render_errors_split_by_kind() {
        let unsupported: AppError = RenderError::UnsupportedFormat("txt".into()).into();
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unsupported.code(), "UNSUPPORTED_FORMAT");

        let failed: AppError = RenderError::Pdf("boom".into()).into();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.code(), "DOCUMENT_GENERATION_ERROR");
        assert_eq!(failed.details().unwrap()["format"], "pdf");
    }

    async fn routed_error(debug: bool) -> Value {
        use axum::{middleware::from_fn_with_state, routing::get, Router};
        use tower::ServiceExt;

        let router = Router::new()
            .route(
                "/fail",
                get(|| async {
                    Err::<(), _>(AppError::Internal(
                        anyhow::anyhow!("disk full").context("writing output"),
                    ))
                }),
            )
            .layer(from_fn_with_state(debug, attach_error_chain));
        let request = axum::http::Request::builder().uri("/fail").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_chain_attached_when_debug_enabled() {
        let body = routed_error(true).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal server error occurred");
        assert_eq!(body["error"]["details"]["debug"], json!(["writing output", "disk full"]));
    }

    #[tokio::test]
    async fn test_error_chain_hidden_when_debug_disabled() {
        let body = routed_error(false).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(body["error"]["details"].is_null());
        assert!(!body.to_string().contains("disk full"));
    }

    #[test]
    fn test_not_found_codes() {
        let missing = AppError::from_parse(ParseError::NotFound("resume/cv.pdf".into()), "cv.pdf");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.code(), "RESUME_NOT_FOUND");
        assert_eq!(AppError::FileNotFound("x".into()).code(), "FILE_NOT_FOUND");
    }
}

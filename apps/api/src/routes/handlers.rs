use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::DocumentFormat;
use crate::rendering::files::is_generated_filename;
use crate::rendering::OutputFormat;
use crate::state::AppState;
use crate::workflow::{self, TailorRequest, TailorResponse};

const RAW_PREVIEW_CHARS: usize = 500;

async fn blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| anyhow::anyhow!("blocking task failed: {e}"))?
        .map_err(|e| AppError::Internal(e.into()))
}

/// GET /resume/info
pub async fn handle_resume_info(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let config = &state.config;
    if config.resume_filename.is_empty() {
        return Err(AppError::Configuration("RESUME_FILENAME is not set".into()));
    }
    let path = config.resume_path();
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| AppError::ResumeNotFound { path: path.clone() })?;
    let format = DocumentFormat::from_path(&path).ok();
    let modified = metadata.modified().ok().map(DateTime::<Local>::from);

    Ok(Json(json!({
        "filename": config.resume_filename,
        "path": path.display().to_string(),
        "format": format,
        "size_bytes": metadata.len(),
        "modified": modified,
        "exists": true,
    })))
}

/// GET /resume/parse
pub async fn handle_resume_parse(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let resume = workflow::load_resume(&state.config).await?;
    let preview: String = resume.raw_text.chars().take(RAW_PREVIEW_CHARS).collect();
    let truncated = resume.raw_text.chars().count() > RAW_PREVIEW_CHARS;

    Ok(Json(json!({
        "status": "success",
        "resume": resume.summary(),
        "raw_text_preview": preview,
        "preview_truncated": truncated,
    })))
}

/// POST /tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let response = workflow::run_tailor(&state, request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct JobExtractRequest {
    pub job_description: String,
}

/// POST /job/extract
/// Advisory: generation failures come back as an empty record, not an error.
pub async fn handle_job_extract(
    State(state): State<AppState>,
    Json(request): Json<JobExtractRequest>,
) -> Result<Json<Value>, AppError> {
    let job_description = workflow::validate_job_description(&request.job_description)?;
    let details = state.tailoring.extract_job_details(&job_description).await;
    Ok(Json(json!({
        "status": "success",
        "job_details": details,
    })))
}

/// GET /gemini/test
pub async fn handle_gemini_test(State(state): State<AppState>) -> Json<Value> {
    let connected = state.tailoring.test_connection().await;
    Json(json!({
        "connected": connected,
        "model": state.tailoring.model(),
    }))
}

/// GET /download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_generated_filename(&filename) {
        return Err(AppError::Validation(format!("invalid filename: {filename}")));
    }
    let format = OutputFormat::from_filename(&filename)
        .ok_or_else(|| AppError::Validation(format!("invalid filename: {filename}")))?;

    let path = state.renderer.output_dir().join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::FileNotFound(filename.clone()))?;

    info!("Serving {filename} ({} bytes)", bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, format.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /files
pub async fn handle_list_files(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let renderer = state.renderer.clone();
    let files = blocking(move || renderer.list_files()).await?;

    let entries: Vec<Value> = files
        .iter()
        .map(|f| {
            json!({
                "filename": f.filename,
                "format": OutputFormat::from_filename(&f.filename),
                "size_bytes": f.size_bytes,
                "modified": f.modified,
                "download_url": format!("/download/{}", f.filename),
            })
        })
        .collect();

    Ok(Json(json!({
        "count": entries.len(),
        "files": entries,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub keep_count: Option<usize>,
}

/// DELETE /files/cleanup?keep_count=N
pub async fn handle_cleanup(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> Result<Json<Value>, AppError> {
    let keep_count = params.keep_count.unwrap_or(state.config.keep_files);
    let renderer = state.renderer.clone();
    let deleted = blocking(move || renderer.cleanup(keep_count)).await?;

    Ok(Json(json!({
        "status": "success",
        "deleted": deleted,
        "keep_count": keep_count,
    })))
}

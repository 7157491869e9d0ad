//! The parse → tailor → render pipeline for one request.
//!
//! Runs sequentially inside a span tagged with a fresh request id. Extraction
//! and rendering are blocking and run on the blocking pool.

use std::time::Instant;

use anyhow::anyhow;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::parsing::{ParsedResume, ResumeParser};
use crate::rendering::{GeneratedDocument, OutputFormat};
use crate::state::AppState;
use crate::tailoring::TailorInput;

pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 50_000;
const MAX_TITLE_CHARS: usize = 200;
const MAX_URL_CHARS: usize = 2000;
const MAX_EMPHASIS_KEYWORDS: usize = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TailorRequest {
    pub job_description: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_url: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub emphasis_keywords: Option<Vec<String>>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub job_description: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_url: Option<String>,
    pub output_formats: Vec<OutputFormat>,
    pub emphasis_keywords: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &str, value: Option<&String>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Checks a job description alone; shared with the job-extraction endpoint.
pub fn validate_job_description(raw: &str) -> Result<String, AppError> {
    let jd = raw.trim();
    let len = jd.chars().count();
    if len < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::InvalidJobDescription(format!(
            "must be at least {MIN_JOB_DESCRIPTION_CHARS} characters (got {len})"
        )));
    }
    if len > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::InvalidJobDescription(format!(
            "must be at most {MAX_JOB_DESCRIPTION_CHARS} characters (got {len})"
        )));
    }
    Ok(jd.to_string())
}

impl TailorRequest {
    pub fn validate(self) -> Result<ValidatedRequest, AppError> {
        let job_description = validate_job_description(&self.job_description)?;
        let job_title = non_blank(self.job_title);
        let company = non_blank(self.company);
        let job_url = non_blank(self.job_url);

        check_len("job_title", job_title.as_ref(), MAX_TITLE_CHARS)?;
        check_len("company", company.as_ref(), MAX_TITLE_CHARS)?;
        check_len("job_url", job_url.as_ref(), MAX_URL_CHARS)?;

        let emphasis_keywords: Vec<String> = self
            .emphasis_keywords
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if emphasis_keywords.len() > MAX_EMPHASIS_KEYWORDS {
            return Err(AppError::Validation(format!(
                "at most {MAX_EMPHASIS_KEYWORDS} emphasis keywords are allowed"
            )));
        }

        let output_formats = match self.output_formats {
            Some(names) if !names.is_empty() => OutputFormat::parse_list(names.as_slice())?,
            _ => OutputFormat::ALL.to_vec(),
        };

        Ok(ValidatedRequest {
            job_description,
            job_title,
            company,
            job_url,
            output_formats,
            emphasis_keywords,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFileInfo {
    pub filename: String,
    pub format: OutputFormat,
    pub path: String,
    pub size_bytes: u64,
    pub download_url: String,
}

impl From<&GeneratedDocument> for GeneratedFileInfo {
    fn from(doc: &GeneratedDocument) -> Self {
        Self {
            filename: doc.filename.clone(),
            format: doc.format,
            path: doc.path.display().to_string(),
            size_bytes: doc.size_bytes,
            download_url: format!("/download/{}", doc.filename),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TailorResponse {
    pub status: &'static str,
    pub message: String,
    pub request_id: Uuid,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub files_generated: Vec<GeneratedFileInfo>,
    pub output_formats: Vec<OutputFormat>,
    pub keywords_matched: Vec<String>,
    pub processing_time_ms: u64,
    pub tailored_content: String,
    pub suggestions: Vec<String>,
    pub ats_score: Option<u8>,
    pub degraded: bool,
    pub created_at: DateTime<Local>,
}

/// Parses the configured base résumé on the blocking pool.
pub async fn load_resume(config: &Config) -> Result<ParsedResume, AppError> {
    let filename = config.resume_filename.clone();
    if filename.is_empty() {
        return Err(AppError::Configuration("RESUME_FILENAME is not set".into()));
    }
    let parser = ResumeParser::new(config.resume_path())
        .map_err(|e| AppError::from_parse(e, &filename))?;
    debug!(path = %parser.path().display(), format = %parser.format(), "Loading base resume");

    tokio::task::spawn_blocking(move || parser.parse())
        .await
        .map_err(|e| anyhow!("resume parsing task failed: {e}"))?
        .map_err(|e| AppError::from_parse(e, &filename))
}

pub async fn run_tailor(state: &AppState, request: TailorRequest) -> Result<TailorResponse, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("tailor", %request_id);
    tailor_inner(state, request, request_id).instrument(span).await
}

async fn tailor_inner(
    state: &AppState,
    request: TailorRequest,
    request_id: Uuid,
) -> Result<TailorResponse, AppError> {
    let started = Instant::now();
    let request = request.validate()?;
    info!(
        job_title = request.job_title.as_deref().unwrap_or("Unknown"),
        company = request.company.as_deref().unwrap_or("Unknown"),
        job_url = request.job_url.as_deref().unwrap_or(""),
        formats = ?request.output_formats,
        "Tailor request accepted"
    );

    let resume = load_resume(&state.config).await?;

    let tailored = state
        .tailoring
        .tailor_resume(TailorInput {
            resume_text: &resume.raw_text,
            job_description: &request.job_description,
            job_title: request.job_title.as_deref(),
            company: request.company.as_deref(),
            emphasis_keywords: &request.emphasis_keywords,
        })
        .await?;
    if tailored.degraded {
        warn!("Rendering degraded tailoring output");
    }

    let renderer = state.renderer.clone();
    let content = tailored.tailored_text.clone();
    let formats = request.output_formats.clone();
    let job_title = request.job_title.clone();
    let company = request.company.clone();
    let documents = tokio::task::spawn_blocking(move || {
        renderer.generate(&content, &formats, job_title.as_deref(), company.as_deref())
    })
    .await
    .map_err(|e| anyhow!("rendering task failed: {e}"))??;

    let processing_time_ms = started.elapsed().as_millis() as u64;
    info!(
        files = documents.len(),
        processing_time_ms, "Tailor request complete"
    );

    Ok(TailorResponse {
        status: "success",
        message: tailored
            .summary
            .clone()
            .unwrap_or_else(|| "Resume tailored successfully".to_string()),
        request_id,
        job_title: request.job_title,
        company: request.company,
        files_generated: documents.iter().map(GeneratedFileInfo::from).collect(),
        output_formats: request.output_formats,
        keywords_matched: tailored.matched_keywords,
        processing_time_ms,
        tailored_content: tailored.tailored_text,
        suggestions: tailored.suggestions,
        ats_score: tailored.ats_score,
        degraded: tailored.degraded,
        created_at: Local::now(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::rendering::{lines::classify_lines, render_bytes, DocumentRenderer};
    use crate::tailoring::testing::CannedGenerator;
    use crate::tailoring::TailoringClient;

    pub(crate) const JD: &str =
        "We are hiring a backend engineer to build distributed systems in Rust and Go.";

    /// State over a temp dir holding a DOCX base résumé and an output directory.
    pub(crate) fn test_state(root: &Path, generator: CannedGenerator) -> AppState {
        let resume_dir = root.join("resume");
        std::fs::create_dir_all(&resume_dir).unwrap();
        let resume = render_bytes(
            &classify_lines("Jane Doe\njane@x.com | 555-123-4567\nEXPERIENCE\n• Built systems\nSKILLS\nRust, Go"),
            OutputFormat::Docx,
        )
        .unwrap();
        std::fs::write(resume_dir.join("base.docx"), resume).unwrap();

        let config = Config {
            resume_dir,
            resume_filename: "base.docx".into(),
            output_dir: root.join("outputs"),
            ..Config::default()
        };
        AppState {
            renderer: DocumentRenderer::new(&config.output_dir).unwrap(),
            tailoring: TailoringClient::new(Arc::new(generator)),
            config,
        }
    }

    fn request(jd: &str) -> TailorRequest {
        TailorRequest {
            job_description: jd.to_string(),
            ..TailorRequest::default()
        }
    }

    #[test]
    fn test_validate_defaults() {
        let validated = request(JD).validate().unwrap();
        assert_eq!(validated.output_formats, OutputFormat::ALL.to_vec());
        assert!(validated.job_title.is_none());
        assert!(validated.emphasis_keywords.is_empty());
    }

    #[test]
    fn test_validate_job_description_bounds() {
        let err = request("too short").validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_JOB_DESCRIPTION");
        let err = request(&"x".repeat(50_001)).validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_JOB_DESCRIPTION");
        assert!(request(&"x".repeat(50)).validate().is_ok());
    }

    #[test]
    fn test_validate_field_limits() {
        let mut long_title = request(JD);
        long_title.job_title = Some("t".repeat(201));
        assert_eq!(long_title.validate().unwrap_err().code(), "VALIDATION_ERROR");

        let mut many_keywords = request(JD);
        many_keywords.emphasis_keywords = Some((0..21).map(|i| format!("k{i}")).collect());
        assert_eq!(many_keywords.validate().unwrap_err().code(), "VALIDATION_ERROR");

        let mut bad_format = request(JD);
        bad_format.output_formats = Some(vec!["pdf".into(), "html".into()]);
        assert_eq!(bad_format.validate().unwrap_err().code(), "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_run_tailor_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            CannedGenerator::replying(
                "<TAILORED_RESUME>Jane Doe\nSKILLS\n• Rust\nEXPERIENCE\n• Built systems</TAILORED_RESUME>\
                 <CHANGES_SUMMARY>Led with Rust.</CHANGES_SUMMARY>\
                 <MATCHED_KEYWORDS>Rust, distributed systems</MATCHED_KEYWORDS>\
                 <ATS_SCORE>88</ATS_SCORE>",
            ),
        );

        let mut req = request(JD);
        req.company = Some("Acme, Inc!".into());
        let response = run_tailor(&state, req).await.unwrap();

        assert_eq!(response.status, "success");
        assert_eq!(response.message, "Led with Rust.");
        assert_eq!(response.files_generated.len(), 2);
        assert!(response.files_generated[0]
            .download_url
            .starts_with("/download/resume_tailored_Acme_Inc_"));
        assert_eq!(response.ats_score, Some(88));
        assert!(!response.degraded);
        assert_eq!(state.renderer.list_files().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_tailor_generation_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), CannedGenerator::new(vec![]));

        let err = run_tailor(&state, request(JD)).await.unwrap_err();
        assert_eq!(err.code(), "GENERATION_SERVICE_ERROR");
        assert!(state.renderer.list_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_resume_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(dir.path(), CannedGenerator::new(vec![]));
        state.config.resume_filename = "absent.pdf".into();
        let err = load_resume(&state.config).await.unwrap_err();
        assert_eq!(err.code(), "RESUME_NOT_FOUND");
    }
}

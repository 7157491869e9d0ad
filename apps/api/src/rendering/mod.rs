//! Document Renderer: tailored text in, styled PDF / DOCX files out.
//!
//! Every requested format is rendered to memory before anything touches the
//! output directory, so an unsupported format or a render failure leaves no
//! partial batch behind. Files are written through a temp file and persisted
//! without replacing an existing file, so two requests landing in the same
//! second never share a name.

pub mod docx;
pub mod files;
pub mod lines;
pub mod metrics;
pub mod pdf;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Suffixed names tried before giving up on a taken filename.
const MAX_NAME_ATTEMPTS: usize = 100;

use lines::{classify_lines, DocLine};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported output format: {0}. Supported: pdf, docx")]
    UnsupportedFormat(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Pdf, OutputFormat::Docx];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }

    /// Parses requested format names, dropping duplicates. Any unknown name
    /// fails the whole list.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<OutputFormat>, RenderError> {
        let mut formats = Vec::new();
        for name in names {
            let format: OutputFormat = name.as_ref().parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Local>,
}

/// Renders classified lines to bytes in one format.
pub fn render_bytes(lines: &[DocLine], format: OutputFormat) -> Result<Vec<u8>, RenderError> {
    let title = lines
        .iter()
        .find_map(|l| match l {
            DocLine::Name(name) => Some(name.as_str()),
            _ => None,
        })
        .unwrap_or("Resume");
    match format {
        OutputFormat::Pdf => pdf::render_pdf(lines, title),
        OutputFormat::Docx => docx::render_docx(lines, title),
    }
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    output_dir: PathBuf,
}

impl DocumentRenderer {
    /// Creates the output directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|e| RenderError::io(&output_dir, e))?;
        info!("Document renderer writing to {}", output_dir.display());
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Blocking. Produces one [`GeneratedDocument`] per format, or nothing.
    pub fn generate(
        &self,
        content: &str,
        formats: &[OutputFormat],
        job_title: Option<&str>,
        company: Option<&str>,
    ) -> Result<Vec<GeneratedDocument>, RenderError> {
        let lines = classify_lines(content);
        debug!("Classified {} lines for rendering", lines.len());

        let rendered = formats
            .iter()
            .map(|&format| render_bytes(&lines, format).map(|bytes| (format, bytes)))
            .collect::<Result<Vec<_>, _>>()?;

        let created_at = Local::now();
        let mut written: Vec<GeneratedDocument> = Vec::with_capacity(rendered.len());
        for (format, bytes) in rendered {
            let base = files::build_filename(format.extension(), company, job_title, created_at);
            match self.write_atomic(&base, &bytes) {
                Ok((filename, path)) => written.push(GeneratedDocument {
                    path,
                    format,
                    filename,
                    size_bytes: bytes.len() as u64,
                    created_at,
                }),
                Err(e) => {
                    for doc in &written {
                        if let Err(remove_err) = std::fs::remove_file(&doc.path) {
                            warn!("Failed to remove partial output {}: {remove_err}", doc.filename);
                        }
                    }
                    return Err(e);
                }
            }
        }

        info!(
            "Generated {} documents: {:?}",
            written.len(),
            written.iter().map(|d| d.filename.as_str()).collect::<Vec<_>>()
        );
        Ok(written)
    }

    /// Persists under `base`, or the first free suffixed variant of it.
    /// Returns the name actually used.
    fn write_atomic(&self, base: &str, bytes: &[u8]) -> Result<(String, PathBuf), RenderError> {
        let base_path = self.output_dir.join(base);
        let mut tmp = tempfile::Builder::new()
            .prefix(".partial_")
            .tempfile_in(&self.output_dir)
            .map_err(|e| RenderError::io(&base_path, e))?;
        tmp.write_all(bytes).map_err(|e| RenderError::io(&base_path, e))?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = files::with_attempt_suffix(base, attempt);
            let path = self.output_dir.join(&filename);
            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok((filename, path)),
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{filename} already exists, trying the next suffix");
                    tmp = e.file;
                }
                Err(e) => return Err(RenderError::io(&path, e.error)),
            }
        }
        Err(RenderError::io(
            &base_path,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("no free name after {MAX_NAME_ATTEMPTS} attempts"),
            ),
        ))
    }

    pub fn list_files(&self) -> std::io::Result<Vec<files::StoredFile>> {
        files::list_generated(&self.output_dir)
    }

    pub fn cleanup(&self, keep_count: usize) -> std::io::Result<usize> {
        files::cleanup(&self.output_dir, keep_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{clean_text, extract_text, DocumentFormat};
    use crate::parsing::ParsedResume;

    const SAMPLE: &str = "Jane Doe\nEXPERIENCE\n• Built systems\njane@x.com | 555-1234";

    #[test]
    fn test_parse_list_dedups_and_rejects_unknown() {
        let formats = OutputFormat::parse_list(&["pdf", "DOCX", ".pdf"]).unwrap();
        assert_eq!(formats, vec![OutputFormat::Pdf, OutputFormat::Docx]);
        assert!(matches!(
            OutputFormat::parse_list(&["pdf", "txt"]),
            Err(RenderError::UnsupportedFormat(f)) if f == "txt"
        ));
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(OutputFormat::from_filename("resume_tailored_x.docx"), Some(OutputFormat::Docx));
        assert_eq!(OutputFormat::from_filename("resume_tailored_x"), None);
    }

    #[test]
    fn test_generate_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocumentRenderer::new(dir.path().join("out")).unwrap();

        let docs = renderer
            .generate(SAMPLE, &OutputFormat::ALL, Some("Backend Engineer"), Some("Acme, Inc!"))
            .unwrap();

        assert_eq!(docs.len(), 2);
        for doc in &docs {
            assert!(doc.size_bytes > 0);
            assert!(doc.path.exists());
            assert!(doc.filename.starts_with("resume_tailored_Acme_Inc_Backend_Engineer_"));
            assert_eq!(std::fs::metadata(&doc.path).unwrap().len(), doc.size_bytes);
        }
        assert_eq!(docs[0].format, OutputFormat::Pdf);
        assert!(std::fs::read(&docs[0].path).unwrap().starts_with(b"%PDF"));

        let listed = renderer.list_files().unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_same_second_batches_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocumentRenderer::new(dir.path()).unwrap();
        let formats = [OutputFormat::Docx];

        let first = renderer
            .generate("Alice Smith\nEXPERIENCE\n• Led Rust team", &formats, Some("Eng"), Some("Acme"))
            .unwrap();
        // Force the same base name regardless of the wall clock.
        let taken = first[0].filename.clone();
        let (filename, path) = renderer.write_atomic(&taken, b"second").unwrap();
        assert_ne!(filename, taken);
        assert!(filename.ends_with("_2.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let second = renderer
            .generate("Bob Jones\nEXPERIENCE\n• Shipped Go services", &formats, Some("Eng"), Some("Acme"))
            .unwrap();
        assert_ne!(second[0].filename, first[0].filename);

        let raw = extract_text(&std::fs::read(&first[0].path).unwrap(), DocumentFormat::Docx).unwrap();
        assert!(raw.contains("Alice Smith"));
        assert!(!raw.contains("Bob"));
        assert_eq!(renderer.list_files().unwrap().len(), 3);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocumentRenderer::new(dir.path()).unwrap();
        renderer.generate(SAMPLE, &[OutputFormat::Docx], None, None).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("resume_tailored_"));
    }

    #[test]
    fn test_parsed_text_renders_again() {
        let first = render_bytes(&classify_lines(SAMPLE), OutputFormat::Docx).unwrap();
        let raw = extract_text(&first, DocumentFormat::Docx).unwrap();
        let parsed = ParsedResume::from_text("round.docx", DocumentFormat::Docx, clean_text(&raw));
        assert_eq!(parsed.contact_info.email.as_deref(), Some("jane@x.com"));

        for format in OutputFormat::ALL {
            let bytes = render_bytes(&classify_lines(&parsed.raw_text), format).unwrap();
            assert!(!bytes.is_empty());
        }
    }
}

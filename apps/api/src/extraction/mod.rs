//! Text Extractor: pulls raw text out of PDF / DOCX résumé binaries.
//!
//! Extraction is deterministic: a document that fails to open fails the same
//! way every time, so nothing here retries.

pub mod clean;
pub mod docx;
pub mod pdf;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use clean::clean_text;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format: {0}. Supported: pdf, docx, doc")]
    UnsupportedFormat(String),

    #[error("Failed to extract {format} text: {reason}")]
    Extraction {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExtractError {
    pub(crate) fn extraction(format: DocumentFormat, reason: impl Into<String>) -> Self {
        ExtractError::Extraction {
            format,
            reason: reason.into(),
        }
    }
}

/// Declared format of an input résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy Word. Only readable when the content is actually an OOXML package.
    Doc,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
        }
    }

    /// Resolves the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for DocumentFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "doc" => Ok(DocumentFormat::Doc),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the document text in reading order, one line per paragraph and one
/// line per table row (cells joined by `" | "`). The result is NOT normalized;
/// callers run [`clean_text`] over it.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    debug!("Extracting {} text from {} bytes", format, bytes.len());
    let text = match format {
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentFormat::Docx | DocumentFormat::Doc => docx::extract_docx_text(bytes, format)?,
    };
    debug!("Extracted {} characters", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parses_case_insensitively() {
        assert_eq!("PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!(".Docx".parse::<DocumentFormat>().unwrap(), DocumentFormat::Docx);
        assert_eq!("doc".parse::<DocumentFormat>().unwrap(), DocumentFormat::Doc);
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let err = "txt".parse::<DocumentFormat>().unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ref f) if f == "txt"));
    }

    #[test]
    fn test_format_from_path_uses_extension() {
        let format = DocumentFormat::from_path(Path::new("resume/Jane_Doe.PDF")).unwrap();
        assert_eq!(format, DocumentFormat::Pdf);
        assert!(DocumentFormat::from_path(Path::new("resume/no_extension")).is_err());
    }

    #[test]
    fn test_garbage_pdf_bytes_fail_with_extraction_error() {
        let err = extract_text(b"definitely not a pdf", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }
}

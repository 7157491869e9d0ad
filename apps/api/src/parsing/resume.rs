//! Résumé Model Builder: composes extraction, segmentation and entity
//! extraction into one immutable [`ParsedResume`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::extraction::{clean_text, extract_text, DocumentFormat};
use crate::parsing::contact::{extract_contact_info, ContactInfo};
use crate::parsing::sections::{segment_sections, SectionMap};
use crate::parsing::skills::extract_skills;
use crate::parsing::ParseError;

#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    pub raw_text: String,
    pub filename: String,
    pub format: DocumentFormat,
    pub sections: SectionMap,
    pub contact_info: ContactInfo,
    pub skills: Vec<String>,
    pub word_count: usize,
}

/// The externally exposed shape of a parsed résumé.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeSummary {
    pub filename: String,
    pub format: DocumentFormat,
    pub word_count: usize,
    pub sections: Vec<String>,
    pub skills: Vec<String>,
    pub contact_info: ContactInfo,
}

impl ParsedResume {
    /// Builds the record from already-cleaned text.
    pub fn from_text(filename: impl Into<String>, format: DocumentFormat, text: String) -> Self {
        let sections = segment_sections(&text);
        let contact_info = extract_contact_info(&text);
        let word_count = text.split_whitespace().count();

        let mut parsed = Self {
            raw_text: text,
            filename: filename.into(),
            format,
            sections,
            contact_info,
            skills: Vec::new(),
            word_count,
        };
        parsed.skills = extract_skills(&parsed.raw_text, parsed.get_section("skills"));

        debug!(
            "Parsed {} sections, {} skills, {} words",
            parsed.sections.len(),
            parsed.skills.len(),
            parsed.word_count
        );
        parsed
    }

    /// First section whose key contains `name`, case-insensitively.
    pub fn get_section(&self, name: &str) -> Option<&str> {
        let needle = name.to_lowercase();
        self.sections
            .iter()
            .find(|s| s.name.contains(&needle))
            .map(|s| s.body.as_str())
    }

    pub fn summary(&self) -> ResumeSummary {
        ResumeSummary {
            filename: self.filename.clone(),
            format: self.format,
            word_count: self.word_count,
            sections: self.sections.names(),
            skills: self.skills.clone(),
            contact_info: self.contact_info.clone(),
        }
    }
}

/// Parses one résumé file on disk. The path and format are validated up front.
#[derive(Debug, Clone)]
pub struct ResumeParser {
    path: PathBuf,
    format: DocumentFormat,
}

impl ResumeParser {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ParseError> {
        let path = path.into();
        if !path.is_file() {
            return Err(ParseError::NotFound(path));
        }
        let format = DocumentFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Blocking: reads the file and runs the full pipeline.
    pub fn parse(&self) -> Result<ParsedResume, ParseError> {
        let bytes = std::fs::read(&self.path).map_err(|source| ParseError::Io {
            path: self.path.clone(),
            source,
        })?;
        let parsed = parse_bytes(&self.filename(), self.format, &bytes)?;
        info!(
            "Parsed resume {}: {} words, {} skills",
            parsed.filename,
            parsed.word_count,
            parsed.skills.len()
        );
        Ok(parsed)
    }
}

/// Extracts, cleans and structures an in-memory document.
pub fn parse_bytes(
    filename: &str,
    format: DocumentFormat,
    bytes: &[u8],
) -> Result<ParsedResume, ParseError> {
    let raw = extract_text(bytes, format)?;
    Ok(ParsedResume::from_text(filename, format, clean_text(&raw)))
}

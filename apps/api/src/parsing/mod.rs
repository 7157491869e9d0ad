//! Heuristic structuring of extracted résumé text: headings, sections, contact
//! fields, skills, and the aggregate [`ParsedResume`] record.

pub mod contact;
pub mod headings;
pub mod resume;
pub mod sections;
pub mod skills;

use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::ExtractError;

pub use resume::{ParsedResume, ResumeParser};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Resume file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

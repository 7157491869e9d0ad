//! Section-heading detection shared by the segmenter and the document renderer.
//!
//! A line is a heading when either:
//! - it is one of the canonical résumé section names (case-insensitive, optional
//!   trailing colon), or
//! - it is an ALL-CAPS line of 2–5 words.
//!
//! Known limitation: the ALL-CAPS rule also fires on short upper-case content
//! lines such as `"AWS GCP AZURE"`. Downstream consumers rely on this behavior,
//! so it is not narrowed here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical résumé section names, one alternation each.
pub const SECTION_CATALOGUE: &[&str] = &[
    r"(?:professional\s+)?summary",
    r"(?:career\s+)?objective",
    r"profile",
    r"about(?:\s+me)?",
    r"(?:professional\s+|work\s+)?experience",
    r"(?:work\s+)?history",
    r"employment(?:\s+history)?",
    r"education",
    r"(?:technical\s+)?skills",
    r"core\s+competencies",
    r"competencies",
    r"certifications?",
    r"(?:notable\s+)?projects?",
    r"achievements?",
    r"accomplishments?",
    r"awards?",
    r"publications?",
    r"languages?",
    r"interests?",
    r"hobbies",
    r"references?",
    r"volunteer(?:ing)?",
    r"leadership",
    r"training",
    r"courses?",
];

static CATALOGUE_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = SECTION_CATALOGUE.join("|");
    Regex::new(&format!(r"(?i)^(?:{alternation})\s*:?$")).expect("valid section catalogue")
});

/// True if the trimmed line names a canonical section.
pub fn is_catalogue_heading(line: &str) -> bool {
    CATALOGUE_RE.is_match(line.trim())
}

/// True if the line has at least one cased letter, no lower-case letters, and 2–5 words.
pub fn is_all_caps_heading(line: &str) -> bool {
    let line = line.trim();
    let has_cased = line.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    if !has_cased || line.chars().any(char::is_lowercase) {
        return false;
    }
    (2..=5).contains(&line.split_whitespace().count())
}

/// The single heading predicate used across parsing and rendering.
pub fn is_section_heading(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && (is_catalogue_heading(line) || is_all_caps_heading(line))
}

//! Parsing of the tag-delimited tailoring response.
//!
//! Every block is looked up on its own; a missing block leaves its field empty.
//! A response without the `TAILORED_RESUME` block is kept whole as the tailored
//! text and flagged `degraded`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tailoring::prompts::{
    TAG_ATS_SCORE, TAG_CHANGES_SUMMARY, TAG_MATCHED_KEYWORDS, TAG_SUGGESTIONS,
    TAG_TAILORED_RESUME,
};

static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s*").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailoredContent {
    pub tailored_text: String,
    pub summary: Option<String>,
    pub matched_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    /// ATS compatibility estimate, clamped to 0..=100.
    pub ats_score: Option<u8>,
    /// True when the response lacked the tailored-résumé block and the raw
    /// response was used instead.
    pub degraded: bool,
}

/// Trimmed body of the first `<tag>…</tag>` block, if present.
fn extract_block<'a>(raw: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = raw.find(&open)? + open.len();
    let len = raw[start..].find(&close)?;
    Some(raw[start..start + len].trim())
}

fn parse_keywords(block: &str) -> Vec<String> {
    block
        .split([',', '\n'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_suggestions(block: &str) -> Vec<String> {
    block
        .lines()
        .map(|line| LIST_MARKER_RE.replace(line.trim(), "").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Integer score clamped to 0..=100. Anything non-numeric is treated as absent.
pub fn parse_ats_score(block: &str) -> Option<u8> {
    let value = block.trim().trim_end_matches('%').trim();
    let score: i64 = value.parse().ok()?;
    // clamp keeps the value in u8 range
    Some(score.clamp(0, 100) as u8)
}

pub fn parse_tailored_response(raw: &str) -> TailoredContent {
    let (tailored_text, degraded) = match extract_block(raw, TAG_TAILORED_RESUME) {
        Some(text) if !text.is_empty() => (text.to_string(), false),
        _ => {
            warn!(
                response_len = raw.len(),
                "Tailoring response missing {TAG_TAILORED_RESUME} block; using raw response (degraded)"
            );
            (raw.trim().to_string(), true)
        }
    };

    TailoredContent {
        tailored_text,
        summary: extract_block(raw, TAG_CHANGES_SUMMARY)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        matched_keywords: extract_block(raw, TAG_MATCHED_KEYWORDS)
            .map(parse_keywords)
            .unwrap_or_default(),
        suggestions: extract_block(raw, TAG_SUGGESTIONS)
            .map(parse_suggestions)
            .unwrap_or_default(),
        ats_score: extract_block(raw, TAG_ATS_SCORE).and_then(parse_ats_score),
        degraded,
    }
}

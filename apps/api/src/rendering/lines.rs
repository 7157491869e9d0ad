//! Format-independent line classification for rendered résumé text.
//!
//! Rules, first match wins, for each non-blank line:
//! 1. separator (3+ of `- = _ *` and nothing else) → horizontal rule
//! 2. section heading (shared predicate with the segmenter) → heading
//! 3. leading `•`, `-` or `*` → bullet, marker stripped
//! 4. `|` with at least two fields → centered meta line
//! 5. first remaining line → candidate name (at most once)
//! 6. anything else → body paragraph
//!
//! Blank lines become vertical spacing.

use serde::Serialize;

use crate::parsing::headings::is_section_heading;

const SEPARATOR_CHARS: &[char] = &['-', '=', '_', '*'];
const BULLET_MARKERS: &[char] = &['•', '-', '*'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DocLine {
    Spacer,
    Rule,
    Name(String),
    Heading(String),
    Bullet(String),
    Meta(String),
    Body(String),
}

fn is_separator(line: &str) -> bool {
    line.chars().count() >= 3 && line.chars().all(|c| SEPARATOR_CHARS.contains(&c))
}

/// Non-empty `|`-separated fields, if there are at least two.
fn pipe_fields(line: &str) -> Option<Vec<&str>> {
    if !line.contains('|') {
        return None;
    }
    let fields: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    (fields.len() >= 2).then_some(fields)
}

pub fn classify_lines(text: &str) -> Vec<DocLine> {
    let mut out = Vec::new();
    let mut name_assigned = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push(DocLine::Spacer);
            continue;
        }

        let kind = if is_separator(line) {
            DocLine::Rule
        } else if is_section_heading(line) {
            DocLine::Heading(line.to_string())
        } else if let Some(rest) = line.strip_prefix(BULLET_MARKERS) {
            DocLine::Bullet(rest.trim_start_matches(BULLET_MARKERS).trim().to_string())
        } else if let Some(fields) = pipe_fields(line) {
            DocLine::Meta(fields.join(" | "))
        } else if !name_assigned {
            name_assigned = true;
            DocLine::Name(line.to_string())
        } else {
            DocLine::Body(line.to_string())
        };
        out.push(kind);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_classification_order() {
        let lines = classify_lines("Jane Doe\nEXPERIENCE\n• Built systems\njane@x.com | 555-1234");
        assert_eq!(
            lines,
            vec![
                DocLine::Name("Jane Doe".into()),
                DocLine::Heading("EXPERIENCE".into()),
                DocLine::Bullet("Built systems".into()),
                DocLine::Meta("jane@x.com | 555-1234".into()),
            ]
        );
    }

    #[test]
    fn test_separator_beats_bullet() {
        assert_eq!(classify_lines("---"), vec![DocLine::Rule]);
        assert_eq!(classify_lines("=*=*="), vec![DocLine::Rule]);
        assert_eq!(classify_lines("--"), vec![DocLine::Bullet(String::new())]);
    }

    #[test]
    fn test_bullet_markers_stripped() {
        assert_eq!(
            classify_lines("- Led migration\n* Cut costs\n•Shipped"),
            vec![
                DocLine::Bullet("Led migration".into()),
                DocLine::Bullet("Cut costs".into()),
                DocLine::Bullet("Shipped".into()),
            ]
        );
    }

    #[test]
    fn test_name_assigned_once() {
        assert_eq!(
            classify_lines("Jane Doe\nSenior Engineer"),
            vec![
                DocLine::Name("Jane Doe".into()),
                DocLine::Body("Senior Engineer".into()),
            ]
        );
    }

    #[test]
    fn test_name_is_first_unconsumed_line_not_first_line() {
        let lines = classify_lines("SUMMARY\nBackend engineer\nLoves Rust");
        assert_eq!(lines[1], DocLine::Name("Backend engineer".into()));
        assert_eq!(lines[2], DocLine::Body("Loves Rust".into()));
    }

    #[test]
    fn test_single_pipe_field_is_not_meta() {
        assert_eq!(
            classify_lines("Jane\nRust |"),
            vec![DocLine::Name("Jane".into()), DocLine::Body("Rust |".into())]
        );
    }

    #[test]
    fn test_blank_lines_become_spacers() {
        assert_eq!(
            classify_lines("Jane\n\n  \nSKILLS"),
            vec![
                DocLine::Name("Jane".into()),
                DocLine::Spacer,
                DocLine::Spacer,
                DocLine::Heading("SKILLS".into()),
            ]
        );
    }
}

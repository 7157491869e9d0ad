use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalizes extracted text into `ExtractedText` form:
/// - CRLF / CR line endings become `\n`
/// - control characters other than `\n` / `\t` are dropped
/// - runs of horizontal whitespace collapse to one space, lines are trimmed
/// - runs of blank lines are capped at a single blank line
pub fn clean_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let stripped: String = unified
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let collapsed = HORIZONTAL_WS.replace_all(&stripped, " ");
    let trimmed_lines = collapsed
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

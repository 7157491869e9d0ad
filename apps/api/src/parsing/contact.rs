//! Contact extraction. Each field is an independent first-match pass over the
//! whole text, not just the header section.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid regex")
});

// North-American groupings: (123) 456-7890, 123-456-7890, 123.456.7890, +1 123 456 7890.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-. \t]?)?\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4}").expect("valid regex")
});

static LINKEDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)linkedin\.com/in/[\w-]+").expect("valid regex"));

static GITHUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)github\.com/[\w-]+").expect("valid regex"));

// "San Francisco, CA" / "Austin, TX". Also hits skill lists such as
// "Python, ML" when no real location precedes them.
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-zA-Z]+(?: [A-Z][a-zA-Z]+){0,2}, [A-Z]{2}\b").expect("valid regex")
});

static HAS_LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_contact_info(text: &str) -> ContactInfo {
    let contact = ContactInfo {
        email: first_match(&EMAIL_RE, text),
        phone: first_match(&PHONE_RE, text),
        linkedin: first_match(&LINKEDIN_RE, text),
        github: first_match(&GITHUB_RE, text),
        location: first_match(&LOCATION_RE, text),
        name: infer_name(text),
    };
    debug!(
        email = contact.email.is_some(),
        phone = contact.phone.is_some(),
        linkedin = contact.linkedin.is_some(),
        github = contact.github.is_some(),
        name = contact.name.is_some(),
        "Contact fields extracted"
    );
    contact
}

/// The first non-empty line is taken as the candidate name when it has no `@`,
/// is under 50 characters, contains a letter, and does not start with a digit.
fn infer_name(text: &str) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let looks_like_name = !first.contains('@')
        && first.chars().count() < 50
        && HAS_LETTER_RE.is_match(first)
        && !first.starts_with(|c: char| c.is_ascii_digit());
    looks_like_name.then(|| first.to_string())
}

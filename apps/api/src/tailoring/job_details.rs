//! Job-posting metadata extracted by the generation service.
//!
//! Advisory only: every failure path ends in a (possibly empty) [`JobDetails`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::llm_client::strip_json_fences;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""title"\s*:\s*"([^"]*)""#).expect("valid regex"));
static COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""company"\s*:\s*"([^"]*)""#).expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetails {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub required_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub preferred_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub responsibilities: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub benefits: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl JobDetails {
    pub fn is_empty(&self) -> bool {
        *self == JobDetails::default()
    }
}

fn captured(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// JSON first (fences stripped); otherwise pull `"title"` / `"company"` straight
/// out of the text; otherwise an empty record.
pub fn parse_job_details(raw: &str) -> JobDetails {
    let body = strip_json_fences(raw);
    match serde_json::from_str::<JobDetails>(body) {
        Ok(details) => {
            debug!("Parsed job details JSON");
            details
        }
        Err(e) => {
            warn!("Job details response was not valid JSON ({e}); falling back to pattern search");
            JobDetails {
                title: captured(&TITLE_RE, raw),
                company: captured(&COMPANY_RE, raw),
                ..JobDetails::default()
            }
        }
    }
}

//! Tailoring Client: résumé + job description in, [`TailoredContent`] out.
//!
//! Built on any [`TextGenerator`]; the service wires in the Gemini client and
//! tests use a canned generator.

pub mod job_details;
pub mod prompts;
pub mod response;

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::{LlmError, TextGenerator};

pub use job_details::JobDetails;
pub use response::TailoredContent;

/// Inputs for one tailoring call.
#[derive(Debug, Clone, Copy)]
pub struct TailorInput<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub job_title: Option<&'a str>,
    pub company: Option<&'a str>,
    pub emphasis_keywords: &'a [String],
}

#[derive(Clone)]
pub struct TailoringClient {
    generator: Arc<dyn TextGenerator>,
}

impl TailoringClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// One generation call. Transport and API failures propagate; a response
    /// missing its tagged blocks does not.
    pub async fn tailor_resume(&self, input: TailorInput<'_>) -> Result<TailoredContent, LlmError> {
        info!(
            job_title = input.job_title.unwrap_or("Unknown"),
            company = input.company.unwrap_or("Unknown"),
            resume_len = input.resume_text.len(),
            jd_len = input.job_description.len(),
            keywords = input.emphasis_keywords.len(),
            "Tailoring resume"
        );

        let prompt = prompts::build_tailor_prompt(
            input.resume_text,
            input.job_description,
            input.job_title,
            input.company,
            input.emphasis_keywords,
        );
        let raw = self.generator.generate(&prompt).await?;
        let content = response::parse_tailored_response(&raw);

        info!(
            tailored_len = content.tailored_text.len(),
            keywords_matched = content.matched_keywords.len(),
            ats_score = ?content.ats_score,
            degraded = content.degraded,
            "Tailoring complete"
        );
        Ok(content)
    }

    /// Never fails: generation errors degrade to an empty record.
    pub async fn extract_job_details(&self, job_description: &str) -> JobDetails {
        let prompt = prompts::build_job_details_prompt(job_description);
        match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let details = job_details::parse_job_details(&raw);
                if details.is_empty() {
                    warn!("No job details recovered from the generation reply");
                }
                details
            }
            Err(e) => {
                warn!("Job details extraction failed: {e}");
                JobDetails::default()
            }
        }
    }

    pub async fn test_connection(&self) -> bool {
        match self.generator.generate(prompts::CONNECTION_TEST_PROMPT).await {
            Ok(reply) => !reply.trim().is_empty(),
            Err(e) => {
                warn!("Generation service connection test failed: {e}");
                false
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CannedGenerator;
    use super::*;

    fn input<'a>(keywords: &'a [String]) -> TailorInput<'a> {
        TailorInput {
            resume_text: "Jane Doe\nEXPERIENCE\n• Built systems",
            job_description: "Looking for an engineer who builds systems.",
            job_title: Some("Engineer"),
            company: None,
            emphasis_keywords: keywords,
        }
    }

    #[tokio::test]
    async fn test_tailor_resume_parses_tagged_reply() {
        let generator = Arc::new(CannedGenerator::replying(
            "<TAILORED_RESUME>Jane Doe\nSKILLS\n• Systems</TAILORED_RESUME>\
             <MATCHED_KEYWORDS>systems</MATCHED_KEYWORDS><ATS_SCORE>80</ATS_SCORE>",
        ));
        let client = TailoringClient::new(generator.clone());

        let keywords = vec!["systems".to_string()];
        let content = client.tailor_resume(input(&keywords)).await.unwrap();

        assert_eq!(content.tailored_text, "Jane Doe\nSKILLS\n• Systems");
        assert_eq!(content.matched_keywords, vec!["systems"]);
        assert_eq!(content.ats_score, Some(80));
        assert!(!content.degraded);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Looking for an engineer who builds systems."));
    }

    #[tokio::test]
    async fn test_tailor_resume_flags_degraded_reply() {
        let client = TailoringClient::new(Arc::new(CannedGenerator::replying("Jane Doe\nplain text")));
        let content = client.tailor_resume(input(&[])).await.unwrap();
        assert!(content.degraded);
        assert_eq!(content.tailored_text, "Jane Doe\nplain text");
    }

    #[tokio::test]
    async fn test_tailor_resume_propagates_generation_failure() {
        let client = TailoringClient::new(Arc::new(CannedGenerator::new(vec![Err(
            LlmError::RateLimited("quota".into()),
        )])));
        let err = client.tailor_resume(input(&[])).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_extract_job_details_degrades_to_empty() {
        let client = TailoringClient::new(Arc::new(CannedGenerator::new(vec![Err(
            LlmError::EmptyContent,
        )])));
        assert!(client.extract_job_details("Senior Engineer at Acme").await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_job_details_parses_reply() {
        let client = TailoringClient::new(Arc::new(CannedGenerator::replying(
            r#"{"title": "Senior Engineer", "company": "Acme"}"#,
        )));
        let details = client.extract_job_details("Senior Engineer at Acme").await;
        assert_eq!(details.title.as_deref(), Some("Senior Engineer"));
    }

    #[tokio::test]
    async fn test_connection_reports_bool() {
        let ok = TailoringClient::new(Arc::new(CannedGenerator::replying("OK")));
        assert!(ok.test_connection().await);
        let down = TailoringClient::new(Arc::new(CannedGenerator::new(vec![])));
        assert!(!down.test_connection().await);
    }
}

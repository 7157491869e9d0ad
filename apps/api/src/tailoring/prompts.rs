// Prompt templates for the tailoring and job-extraction calls.
// The tag names here are the contract `response.rs` parses against.

pub const TAG_TAILORED_RESUME: &str = "TAILORED_RESUME";
pub const TAG_CHANGES_SUMMARY: &str = "CHANGES_SUMMARY";
pub const TAG_MATCHED_KEYWORDS: &str = "MATCHED_KEYWORDS";
pub const TAG_SUGGESTIONS: &str = "SUGGESTIONS";
pub const TAG_ATS_SCORE: &str = "ATS_SCORE";

pub const CONNECTION_TEST_PROMPT: &str = "Reply with the single word: OK";

const TAILOR_INSTRUCTIONS: &str = "\
You are an expert resume writer who optimizes resumes for Applicant Tracking Systems (ATS).

Rewrite the candidate's resume so it targets the job description below.

RULES:
1. NEVER invent skills, employers, titles, dates, degrees, metrics or experience that are not in the original resume.
2. Reorder sections, bullets and skills so the most relevant existing content comes first.
3. Rephrase existing bullets to mirror the job description's terminology where it is truthful.
4. Keep a plain ATS-friendly layout: the candidate's name on the first line, a single contact line with fields separated by \" | \", UPPERCASE section headings, and bullets starting with \"• \".
5. Do not use tables, columns, emojis or markdown formatting.";

/// Builds the tailoring prompt. Résumé and job description are embedded verbatim.
pub fn build_tailor_prompt(
    resume_text: &str,
    job_description: &str,
    job_title: Option<&str>,
    company: Option<&str>,
    emphasis_keywords: &[String],
) -> String {
    let mut target = String::new();
    if let Some(title) = job_title.filter(|t| !t.trim().is_empty()) {
        target.push_str(&format!("Target role: {}\n", title.trim()));
    }
    if let Some(company) = company.filter(|c| !c.trim().is_empty()) {
        target.push_str(&format!("Target company: {}\n", company.trim()));
    }
    if !emphasis_keywords.is_empty() {
        target.push_str(&format!(
            "Emphasize these keywords where the resume genuinely supports them: {}\n",
            emphasis_keywords.join(", ")
        ));
    }

    format!(
        "{TAILOR_INSTRUCTIONS}

{target}
=== ORIGINAL RESUME ===
{resume_text}

=== JOB DESCRIPTION ===
{job_description}

Respond using exactly these tagged blocks and nothing else:

<{TAG_TAILORED_RESUME}>
The complete tailored resume as plain text.
</{TAG_TAILORED_RESUME}>

<{TAG_CHANGES_SUMMARY}>
Two or three sentences describing what was changed.
</{TAG_CHANGES_SUMMARY}>

<{TAG_MATCHED_KEYWORDS}>
Comma-separated list of job description keywords present in the tailored resume.
</{TAG_MATCHED_KEYWORDS}>

<{TAG_SUGGESTIONS}>
- One improvement the candidate could make per line.
</{TAG_SUGGESTIONS}>

<{TAG_ATS_SCORE}>
A single integer from 0 to 100 estimating ATS compatibility.
</{TAG_ATS_SCORE}>"
    )
}

/// Builds the job-posting extraction prompt. The model must answer with JSON only.
pub fn build_job_details_prompt(job_description: &str) -> String {
    format!(
        "Extract structured information from the job posting below.

Respond with valid JSON only, no markdown code fences and no commentary, using this schema:
{{
  \"title\": string or null,
  \"company\": string or null,
  \"location\": string or null,
  \"employment_type\": string or null,
  \"experience_level\": string or null,
  \"salary_range\": string or null,
  \"required_skills\": [string],
  \"preferred_skills\": [string],
  \"responsibilities\": [string],
  \"requirements\": [string],
  \"benefits\": [string]
}}

Use null or an empty list when the posting does not state a field.

=== JOB POSTING ===
{job_description}"
    )
}

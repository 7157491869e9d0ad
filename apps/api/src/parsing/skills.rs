//! Skill extraction against a fixed technology catalogue.
//!
//! Each entry is `(pattern, base name)`. Entries that cover spelling variants
//! (`postgres` / `postgresql`, `k8s` / `kubernetes`) are listed separately on
//! purpose, so each variant surfaces under its own canonical name. Keep the list
//! literal: reordering does not change the result set, but merging or renaming
//! entries does.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

#[rustfmt::skip]
const SKILL_CATALOGUE: &[(&str, &str)] = &[
    // Programming languages
    (r"python", "python"), (r"javascript", "javascript"), (r"typescript", "typescript"),
    (r"java", "java"), (r"c\+\+", "c++"), (r"c#", "c#"), (r"ruby", "ruby"), (r"go", "go"),
    (r"rust", "rust"), (r"php", "php"), (r"swift", "swift"), (r"kotlin", "kotlin"),
    (r"scala", "scala"), (r"r", "r"), (r"matlab", "matlab"), (r"perl", "perl"),
    // Web technologies
    (r"html5?", "html5"), (r"css3?", "css3"), (r"react(?:\.?js)?", "react"),
    (r"angular", "angular"), (r"vue(?:\.?js)?", "vue"), (r"node\.?js", "node.js"),
    (r"express", "express"), (r"django", "django"), (r"flask", "flask"),
    (r"fastapi", "fastapi"), (r"spring", "spring"), (r"asp\.?net", "asp.net"),
    (r"next\.?js", "next.js"), (r"nuxt", "nuxt"),
    // Databases
    (r"sql", "sql"), (r"mysql", "mysql"), (r"postgresql", "postgresql"),
    (r"postgres", "postgres"), (r"mongodb", "mongodb"), (r"redis", "redis"),
    (r"elasticsearch", "elasticsearch"), (r"dynamodb", "dynamodb"),
    (r"cassandra", "cassandra"), (r"oracle", "oracle"), (r"sqlite", "sqlite"),
    (r"mariadb", "mariadb"),
    // Cloud & DevOps
    (r"aws", "aws"), (r"amazon web services", "amazon web services"), (r"azure", "azure"),
    (r"gcp", "gcp"), (r"google cloud", "google cloud"), (r"docker", "docker"),
    (r"kubernetes", "kubernetes"), (r"k8s", "k8s"), (r"terraform", "terraform"),
    (r"ansible", "ansible"), (r"jenkins", "jenkins"), (r"ci/?cd", "ci/cd"),
    (r"github actions", "github actions"), (r"gitlab", "gitlab"), (r"circleci", "circleci"),
    // Data & ML
    (r"machine learning", "machine learning"), (r"deep learning", "deep learning"),
    (r"tensorflow", "tensorflow"), (r"pytorch", "pytorch"), (r"keras", "keras"),
    (r"pandas", "pandas"), (r"numpy", "numpy"), (r"scikit-learn", "scikit-learn"),
    (r"sklearn", "sklearn"), (r"nlp", "nlp"), (r"computer vision", "computer vision"),
    (r"data science", "data science"), (r"data analytics", "data analytics"),
    (r"big data", "big data"), (r"spark", "spark"), (r"hadoop", "hadoop"),
    // Tools & others
    (r"git", "git"), (r"linux", "linux"), (r"unix", "unix"), (r"bash", "bash"),
    (r"shell", "shell"), (r"agile", "agile"), (r"scrum", "scrum"), (r"jira", "jira"),
    (r"rest\s?api", "rest api"), (r"graphql", "graphql"), (r"microservices", "microservices"),
    (r"api design", "api design"), (r"system design", "system design"), (r"oauth", "oauth"),
    (r"jwt", "jwt"), (r"websocket", "websocket"),
];

struct SkillPattern {
    regex: Regex,
    canonical: String,
}

static SKILL_PATTERNS: Lazy<Vec<SkillPattern>> = Lazy::new(|| {
    SKILL_CATALOGUE
        .iter()
        .filter_map(|(pattern, name)| {
            Regex::new(&format!("(?i){}", whole_word(pattern)))
                .ok()
                .map(|regex| SkillPattern {
                    regex,
                    canonical: canonicalize(name),
                })
        })
        .collect()
});

/// Wraps a pattern in word boundaries. `\b` only works next to word characters,
/// so patterns ending in `+` or `#` (`c++`, `c#`) get an explicit non-word guard.
fn whole_word(pattern: &str) -> String {
    let ends_with_word_char = pattern
        .trim_end_matches('?')
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == ')' || c == '_');
    let tail = if ends_with_word_char { r"\b" } else { r"(?:\W|$)" };
    format!(r"\b(?:{pattern}){tail}")
}

/// Tokens of ≤4 characters are upper-cased (`SQL`, `AWS`); longer ones are
/// title-cased with every letter after a non-letter capitalized (`Node.Js`).
pub fn canonicalize(name: &str) -> String {
    if name.chars().count() <= 4 {
        return name.to_uppercase();
    }
    let mut out = String::with_capacity(name.len());
    let mut prev_is_letter = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Matches the catalogue against `skills_section` when it has content, otherwise
/// against `full_text`. Returns a sorted, deduplicated list.
pub fn extract_skills(full_text: &str, skills_section: Option<&str>) -> Vec<String> {
    let search_text = match skills_section {
        Some(section) if !section.trim().is_empty() => section,
        _ => full_text,
    };

    let skills: BTreeSet<String> = SKILL_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(search_text))
        .map(|p| p.canonical.clone())
        .collect();

    debug!("Found {} skills", skills.len());
    skills.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalogue_pattern_compiles() {
        assert_eq!(SKILL_PATTERNS.len(), SKILL_CATALOGUE.len());
    }

    #[test]
    fn test_canonicalize_short_tokens_uppercase() {
        assert_eq!(canonicalize("sql"), "SQL");
        assert_eq!(canonicalize("java"), "JAVA");
        assert_eq!(canonicalize("c++"), "C++");
    }

    #[test]
    fn test_canonicalize_long_tokens_title_case() {
        assert_eq!(canonicalize("python"), "Python");
        assert_eq!(canonicalize("machine learning"), "Machine Learning");
        assert_eq!(canonicalize("node.js"), "Node.Js");
        assert_eq!(canonicalize("scikit-learn"), "Scikit-Learn");
    }

    #[test]
    fn test_whole_word_matching() {
        let skills = extract_skills("JavaScript and TypeScript", None);
        assert!(skills.contains(&"Javascript".to_string()));
        assert!(!skills.contains(&"JAVA".to_string()));
    }

    #[test]
    fn test_symbol_suffixed_skills_match() {
        let skills = extract_skills("Languages: C++, C#, Rust", None);
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"C#".to_string()));
        assert!(skills.contains(&"RUST".to_string()));
    }

    #[test]
    fn test_versioned_web_skills_keep_catalogue_names() {
        let skills = extract_skills("Built pages in HTML and CSS3", None);
        assert!(skills.contains(&"Html5".to_string()));
        assert!(skills.contains(&"CSS3".to_string()));
    }

    #[test]
    fn test_skills_section_takes_precedence() {
        let full = "Worked with Django at Acme.\nSkills\nRust, Docker";
        let skills = extract_skills(full, Some("Rust, Docker"));
        assert_eq!(skills, vec!["Docker".to_string(), "RUST".to_string()]);
    }

    #[test]
    fn test_blank_skills_section_falls_back_to_full_text() {
        let skills = extract_skills("Kubernetes and Terraform", Some("   "));
        assert_eq!(skills, vec!["Kubernetes".to_string(), "Terraform".to_string()]);
    }

    #[test]
    fn test_extraction_is_idempotent_sorted_and_deduplicated() {
        let text = "AWS, aws, Amazon Web Services, Python, python3, React.js, react";
        let first = extract_skills(text, None);
        let second = extract_skills(text, None);
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(first, sorted);
        assert!(first.contains(&"React".to_string()));
    }
}

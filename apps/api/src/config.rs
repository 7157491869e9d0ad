use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::extraction::DocumentFormat;

/// Application configuration loaded from environment variables.
/// Values are passed explicitly into each component at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub resume_dir: PathBuf,
    pub resume_filename: String,
    pub output_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub rust_log: String,
    pub log_json: bool,
    pub keep_files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash".to_string(),
            resume_dir: PathBuf::from("resume"),
            resume_filename: String::new(),
            output_dir: PathBuf::from("outputs"),
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            rust_log: "info".to_string(),
            log_json: false,
            keep_files: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset and blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        Ok(Config {
            gemini_api_key: get("GEMINI_API_KEY").unwrap_or(defaults.gemini_api_key),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            resume_dir: get("RESUME_DIR").map(PathBuf::from).unwrap_or(defaults.resume_dir),
            resume_filename: get("RESUME_FILENAME").unwrap_or(defaults.resume_filename),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            host: get("HOST").unwrap_or(defaults.host),
            port: match get("PORT") {
                Some(port) => port
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            debug: get("DEBUG").map(|v| parse_bool(&v)).unwrap_or(defaults.debug),
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            log_json: get("LOG_JSON").map(|v| parse_bool(&v)).unwrap_or(defaults.log_json),
            keep_files: match get("KEEP_FILES") {
                Some(n) => n
                    .parse::<usize>()
                    .context("KEEP_FILES must be a non-negative integer")?,
                None => defaults.keep_files,
            },
        })
    }

    pub fn resume_path(&self) -> PathBuf {
        self.resume_dir.join(&self.resume_filename)
    }

    pub fn resume_exists(&self) -> bool {
        !self.resume_filename.is_empty() && self.resume_path().is_file()
    }

    pub fn gemini_configured(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }

    /// Problems that should be reported before serving. Critical issues abort startup.
    pub fn validate_for_startup(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.gemini_api_key.is_empty() {
            issues.push(ConfigIssue::warning(
                "GEMINI_API_KEY is not set; tailoring requests will fail",
            ));
        }

        if self.resume_filename.is_empty() {
            issues.push(ConfigIssue::critical("RESUME_FILENAME is not set"));
            return issues;
        }

        if let Err(e) = DocumentFormat::from_path(Path::new(&self.resume_filename)) {
            issues.push(ConfigIssue::critical(e.to_string()));
        }

        if !self.resume_path().is_file() {
            issues.push(ConfigIssue::critical(format!(
                "Resume file not found: {}",
                self.resume_path().display()
            )));
        }

        issues
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

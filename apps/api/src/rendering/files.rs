//! Output filename policy and retention-by-count cleanup.
//!
//! Names look like `resume_tailored[_<company>][_<title>]_<YYYYMMDD_HHMMSS>.<ext>`.
//! A name already taken in the same second gets `_2`, `_3`, ... before the
//! extension.
//! Cleanup is best-effort: it can race with a concurrent write and individual
//! delete failures are logged and skipped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const FILENAME_PREFIX: &str = "resume_tailored";
const COMPONENT_MAX_CHARS: usize = 30;

/// Keeps ASCII letters, digits, underscores and whitespace; collapses whitespace
/// runs to one `_`; truncates to 30 characters. `None` when nothing survives.
pub fn sanitize_component(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined.chars().take(COMPONENT_MAX_CHARS).collect();
    (!truncated.is_empty()).then_some(truncated)
}

pub fn build_filename(
    extension: &str,
    company: Option<&str>,
    job_title: Option<&str>,
    timestamp: DateTime<Local>,
) -> String {
    let mut parts = vec![FILENAME_PREFIX.to_string()];
    parts.extend(company.and_then(sanitize_component));
    parts.extend(job_title.and_then(sanitize_component));
    parts.push(timestamp.format("%Y%m%d_%H%M%S").to_string());
    format!("{}.{extension}", parts.join("_"))
}

/// `attempt` 1 is the name itself; later attempts insert `_<attempt>` before
/// the extension.
pub fn with_attempt_suffix(filename: &str, attempt: usize) -> String {
    if attempt <= 1 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{attempt}.{ext}"),
        None => format!("{filename}_{attempt}"),
    }
}

/// True for names this service produces; also rules out any path component.
pub fn is_generated_filename(name: &str) -> bool {
    name.starts_with(&format!("{FILENAME_PREFIX}_"))
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

/// All generated files in `dir`, newest first. A missing directory is empty.
pub fn list_generated(dir: &Path) -> std::io::Result<Vec<StoredFile>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !is_generated_filename(&filename) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!("Skipping {filename}: {e}");
                continue;
            }
        };
        let modified = metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());
        files.push(StoredFile {
            filename,
            path: entry.path(),
            size_bytes: metadata.len(),
            modified,
        });
    }

    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(files)
}

/// Deletes every generated file beyond the `keep_count` most recent.
/// Returns the number actually deleted.
pub fn cleanup(dir: &Path, keep_count: usize) -> std::io::Result<usize> {
    let files = list_generated(dir)?;
    let mut deleted = 0;

    for file in files.iter().skip(keep_count) {
        match std::fs::remove_file(&file.path) {
            Ok(()) => {
                debug!("Deleted old file: {}", file.filename);
                deleted += 1;
            }
            Err(e) => warn!("Failed to delete {}: {e}", file.filename),
        }
    }

    info!("Cleanup complete: deleted {deleted} files, kept {}", files.len() - deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_sanitize_company_punctuation() {
        assert_eq!(sanitize_component("Acme, Inc!").as_deref(), Some("Acme_Inc"));
        assert_eq!(sanitize_component("  Big   Data\tCo ").as_deref(), Some("Big_Data_Co"));
        assert_eq!(sanitize_component("../etc/passwd").as_deref(), Some("etcpasswd"));
        assert_eq!(sanitize_component("!!!"), None);
    }

    #[test]
    fn test_sanitize_truncates_to_30_chars() {
        let long = "Senior Staff Principal Distinguished Engineer";
        let sanitized = sanitize_component(long).unwrap();
        assert_eq!(sanitized.chars().count(), 30);
        assert!(sanitized.starts_with("Senior_Staff_Principal"));
    }

    #[test]
    fn test_build_filename_layout() {
        assert_eq!(
            build_filename("pdf", Some("Acme, Inc!"), Some("Backend Engineer"), fixed_time()),
            "resume_tailored_Acme_Inc_Backend_Engineer_20240309_140507.pdf"
        );
        assert_eq!(
            build_filename("docx", None, Some("???"), fixed_time()),
            "resume_tailored_20240309_140507.docx"
        );
    }

    #[test]
    fn test_attempt_suffix_goes_before_extension() {
        let name = "resume_tailored_Acme_20240102_030405.pdf";
        assert_eq!(with_attempt_suffix(name, 1), name);
        assert_eq!(
            with_attempt_suffix(name, 2),
            "resume_tailored_Acme_20240102_030405_2.pdf"
        );
        assert!(is_generated_filename(&with_attempt_suffix(name, 3)));
    }

    #[test]
    fn test_generated_filename_guard() {
        assert!(is_generated_filename("resume_tailored_20240309_140507.pdf"));
        assert!(!is_generated_filename("resume.pdf"));
        assert!(!is_generated_filename("resume_tailored_../../secret"));
        assert!(!is_generated_filename("resume_tailored_x/y.pdf"));
    }

    #[test]
    fn test_cleanup_keeps_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        for i in 0..15u64 {
            let path = dir.path().join(format!("resume_tailored_{i:02}.pdf"));
            let file = File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i * 60)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let deleted = cleanup(dir.path(), 10).unwrap();
        assert_eq!(deleted, 5);

        let remaining: Vec<String> = list_generated(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(remaining.len(), 10);
        assert_eq!(remaining.first().map(String::as_str), Some("resume_tailored_14.pdf"));
        assert_eq!(remaining.last().map(String::as_str), Some("resume_tailored_05.pdf"));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_of_missing_directory_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup(&dir.path().join("absent"), 0).unwrap(), 0);
    }
}

use std::panic;

use tracing::{debug, warn};

use super::{DocumentFormat, ExtractError};

/// Extracts text from PDF bytes via `pdf-extract`.
///
/// `pdf-extract` panics on some malformed inputs instead of returning an error,
/// so the call is isolated with `catch_unwind` and reported as an extraction failure.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let outcome = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            let message = e.to_string();
            let lower = message.to_lowercase();
            let reason = if lower.contains("encrypt") || lower.contains("password") {
                format!("PDF is encrypted or password-protected ({message})")
            } else {
                message
            };
            warn!("PDF extraction failed: {reason}");
            return Err(ExtractError::extraction(DocumentFormat::Pdf, reason));
        }
        Err(_) => {
            warn!("PDF extraction aborted: parser panicked on malformed input");
            return Err(ExtractError::extraction(
                DocumentFormat::Pdf,
                "unexpected internal PDF structure",
            ));
        }
    };

    // Page breaks come through as form feeds; pages are joined by newlines.
    let pages: Vec<&str> = text.split('\u{c}').collect();
    debug!("PDF text spans {} page(s)", pages.len());
    Ok(pages.join("\n"))
}

//! Resume text extraction: uploaded file bytes in, plain text out.
//!
//! Dispatch is by filename suffix only (case-insensitive); content sniffing
//! is not attempted.

mod docx;
mod pdf;

use thiserror::Error;

/// Human-readable list used in the 415 response.
pub const ALLOWED_FORMATS: &str = "PDF, DOCX, TXT, MD, TEX";

const PLAIN_TEXT_SUFFIXES: [&str; 3] = [".txt", ".md", ".tex"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Allowed: {ALLOWED_FORMATS}.")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let name = filename.to_lowercase();
        if name.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if name.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else if PLAIN_TEXT_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Some(DocumentFormat::PlainText)
        } else {
            None
        }
    }
}

/// Extracts plain text from an uploaded resume.
pub fn extract(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_filename(filename)
        .ok_or_else(|| ExtractError::UnsupportedFormat(filename.to_string()))?;

    match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes),
        DocumentFormat::Docx => docx::extract_text(bytes),
        DocumentFormat::PlainText => Ok(decode_text(bytes)),
    }
}

/// UTF-8 first, Latin-1 otherwise. Latin-1 maps every byte to a code point,
/// so this never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

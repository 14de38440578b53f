//! Error types for text extraction
//!
//! These never cross the crate boundary as `Err`: `FormatExtractor` folds
//! them into `ExtractionResult::error` via their `Display` text.

use thiserror::Error;
use tourbook_domain::{ErrorKind, OcrError};

/// Errors that can occur while extracting text
#[derive(Error, Debug)]
pub enum IngestError {
    /// Neither MIME type nor extension identifies a supported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Input exceeds the configured size limit
    #[error("Input too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// Bytes are not valid UTF-8
    #[error("Failed to decode text: {0}")]
    Decode(String),

    /// PDF parsing failed
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// DOCX container or XML is broken
    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    /// Image input has no bytes
    #[error("Empty image")]
    EmptyImage,

    /// OCR failed
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

impl IngestError {
    /// Classification recorded on the job's error trail
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            IngestError::Ocr(OcrError::Timeout) => ErrorKind::Timeout,
            IngestError::Ocr(OcrError::Cancelled) => ErrorKind::Cancelled,
            _ => ErrorKind::ExtractionFailure,
        }
    }
}

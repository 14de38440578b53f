//! Text extraction results

use crate::job::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported source document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Plain text, markdown, CSV, JSON, HTML, XML, forwarded e-mail
    PlainText,
    /// PDF with a text layer (no OCR)
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// Raster image, read via OCR
    Image,
}

impl DocumentFormat {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "plain_text",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Image => "image",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of extracting text from one input document
///
/// Produced once per document and never mutated afterwards. Failures are
/// encoded in `error` with an empty `text`; nothing is ever thrown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text (empty on failure)
    pub text: String,
    /// Format strategy that ran, `None` when the format was not recognized
    pub format: Option<DocumentFormat>,
    /// Page count, when the format has pages
    pub page_count: Option<usize>,
    /// Whitespace-separated word count
    pub word_count: Option<usize>,
    /// Likely a scanned/image-only document with no usable text layer
    pub is_low_text: bool,
    /// Failure description, if extraction failed
    pub error: Option<String>,
    /// Classification of `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ExtractionResult {
    /// Build a failed result
    pub fn failure(
        format: Option<DocumentFormat>,
        kind: ErrorKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            text: String::new(),
            format,
            page_count: None,
            word_count: None,
            is_low_text: false,
            error: Some(error.into()),
            error_kind: Some(kind),
        }
    }

    /// Whether extraction failed with nothing at all to work with
    pub fn is_fatal(&self) -> bool {
        self.error.is_some() && self.text.trim().is_empty()
    }

    /// Compact snapshot for the job record
    pub fn summary(&self) -> ExtractionSummary {
        ExtractionSummary {
            format: self.format,
            page_count: self.page_count,
            word_count: self.word_count,
            is_low_text: self.is_low_text,
        }
    }
}

/// Quality signals of an extraction, kept on the job for reviewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Format strategy that ran
    pub format: Option<DocumentFormat>,
    /// Page count, when known
    pub page_count: Option<usize>,
    /// Word count, when known
    pub word_count: Option<usize>,
    /// Low-text flag
    pub is_low_text: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_is_fatal() {
        let result = ExtractionResult::failure(
            None,
            ErrorKind::UnsupportedFormat,
            "Unsupported format: zip",
        );
        assert!(result.is_fatal());
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_error_with_text_is_not_fatal() {
        let mut result = ExtractionResult::failure(
            Some(DocumentFormat::Pdf),
            ErrorKind::ExtractionFailure,
            "partial",
        );
        result.text = "some text survived".to_string();
        assert!(!result.is_fatal());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(DocumentFormat::PlainText.to_string(), "plain_text");
        assert_eq!(
            serde_json::to_string(&DocumentFormat::Docx).unwrap(),
            "\"docx\""
        );
    }
}

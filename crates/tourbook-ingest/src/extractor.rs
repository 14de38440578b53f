//! Format-dispatching text extraction

use crate::config::IngestConfig;
use crate::docx::extract_docx;
use crate::error::IngestError;
use crate::format;
use crate::ocr::TesseractOcr;
use crate::pdf::extract_pdf;
use crate::text::{decode_utf8, word_count, EmailInput};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tourbook_domain::{DocumentFormat, ErrorKind, ExtractionResult, OcrEngine};
use tracing::{debug, info, warn};

/// Low-text heuristic for a successfully extracted document
///
/// - images are never low-text
/// - zero words is always low-text
/// - PDFs: fewer than `min_words`, or fewer than `min_words_per_page` per page
/// - DOCX: fewer than `min_words` (no page count to measure density against)
/// - plain text: only when empty
pub fn is_low_text(
    format: DocumentFormat,
    words: usize,
    pages: Option<usize>,
    config: &IngestConfig,
) -> bool {
    match format {
        DocumentFormat::Image => false,
        _ if words == 0 => true,
        DocumentFormat::Pdf => {
            words < config.min_words
                || pages
                    .filter(|p| *p > 0)
                    .is_some_and(|p| words / p < config.min_words_per_page)
        }
        DocumentFormat::Docx => words < config.min_words,
        DocumentFormat::PlainText => false,
    }
}

/// Turns raw bytes of any supported format into text plus quality signals
///
/// Every entry point is total: failures come back inside the
/// [`ExtractionResult`] with empty text, never as a panic or `Err`.
#[derive(Clone)]
pub struct FormatExtractor {
    config: IngestConfig,
    ocr: Arc<dyn OcrEngine>,
}

impl FormatExtractor {
    /// Create an extractor with an explicit OCR engine
    pub fn new(config: IngestConfig, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { config, ocr }
    }

    /// Create an extractor that shells out to tesseract for images
    pub fn with_tesseract(config: IngestConfig) -> Self {
        let ocr = Arc::new(TesseractOcr::from_config(&config));
        Self::new(config, ocr)
    }

    /// Get the configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Extract text from a document
    pub fn extract(&self, bytes: &[u8], file_name: &str, mime: Option<&str>) -> ExtractionResult {
        self.extract_with_cancel(bytes, file_name, mime, &CancellationToken::new())
    }

    /// Extract text from a document, giving up on OCR once `cancel` fires
    pub fn extract_with_cancel(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime: Option<&str>,
        cancel: &CancellationToken,
    ) -> ExtractionResult {
        let format = match format::detect(file_name, mime) {
            Ok(format) => format,
            Err(e) => {
                warn!(file_name, ?mime, "Unsupported format");
                return failure(None, e);
            }
        };
        debug!(file_name, %format, bytes = bytes.len(), "Detected format");

        if bytes.len() > self.config.max_input_bytes {
            return failure(
                Some(format),
                IngestError::TooLarge {
                    size: bytes.len(),
                    max: self.config.max_input_bytes,
                },
            );
        }

        let extracted = match format {
            _ if bytes.is_empty() && format != DocumentFormat::Image => {
                Ok((String::new(), None))
            }
            DocumentFormat::PlainText => decode_utf8(bytes).map(|text| (text, None)),
            DocumentFormat::Pdf => extract_pdf(bytes).map(|pdf| (pdf.text, Some(pdf.page_count))),
            DocumentFormat::Docx => extract_docx(bytes).map(|text| (text, None)),
            DocumentFormat::Image => self.ocr_image(bytes, cancel).map(|text| (text, None)),
        };

        match extracted {
            Ok((text, page_count)) => self.success(format, text, page_count),
            Err(e) => {
                warn!(%format, error = %e, "Text extraction failed");
                failure(Some(format), e)
            }
        }
    }

    /// Extract on a blocking worker thread so OCR and PDF parsing never run
    /// on the async executor
    pub async fn extract_async(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        mime: Option<String>,
        cancel: CancellationToken,
    ) -> ExtractionResult {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            this.extract_with_cancel(&bytes, &file_name, mime.as_deref(), &cancel)
        })
        .await
        .unwrap_or_else(|e| {
            ExtractionResult::failure(
                None,
                ErrorKind::ExtractionFailure,
                format!("Extraction task failed: {}", e),
            )
        })
    }

    /// Treat pasted text as a plain-text document
    pub fn extract_text(&self, text: &str) -> ExtractionResult {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        self.success(DocumentFormat::PlainText, text.to_string(), None)
    }

    /// Treat a forwarded e-mail as a plain-text document
    pub fn extract_email(&self, email: &EmailInput) -> ExtractionResult {
        self.extract_text(&email.render())
    }

    fn ocr_image(&self, bytes: &[u8], cancel: &CancellationToken) -> Result<String, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyImage);
        }
        Ok(self.ocr.recognize(bytes, cancel)?)
    }

    fn success(
        &self,
        format: DocumentFormat,
        text: String,
        page_count: Option<usize>,
    ) -> ExtractionResult {
        let words = word_count(&text);
        let low_text = is_low_text(format, words, page_count, &self.config);

        info!(%format, words, pages = ?page_count, low_text, "Extracted text");
        if low_text && format == DocumentFormat::Pdf {
            warn!(words, pages = ?page_count, "PDF has little or no text layer, likely scanned; no OCR fallback for PDFs");
        }

        ExtractionResult {
            text,
            format: Some(format),
            page_count,
            word_count: Some(words),
            is_low_text: low_text,
            error: None,
            error_kind: None,
        }
    }
}

fn failure(format: Option<DocumentFormat>, error: IngestError) -> ExtractionResult {
    ExtractionResult::failure(format, error.kind(), error.to_string())
}

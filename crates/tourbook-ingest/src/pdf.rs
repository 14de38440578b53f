//! PDF text-layer extraction
//!
//! Only the embedded text layer is read. Image-only PDFs come back with
//! little or no text and are flagged low-text by the caller; they are not
//! rasterized for OCR.

use crate::error::IngestError;
use std::panic::{self, AssertUnwindSafe};

/// Text and page count of a PDF
#[derive(Debug, Clone, PartialEq)]
pub struct PdfText {
    /// Text layer contents
    pub text: String,
    /// Number of pages
    pub page_count: usize,
}

/// Extract the text layer and page count from in-memory PDF bytes
pub fn extract_pdf(bytes: &[u8]) -> Result<PdfText, IngestError> {
    // pdf-extract panics on some malformed inputs
    let text = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| IngestError::Pdf("parser panicked on malformed input".to_string()))?
        .map_err(|e| IngestError::Pdf(e.to_string()))?;

    let page_count = page_count(bytes).unwrap_or_else(|| count_form_feeds(&text));
    Ok(PdfText { text, page_count })
}

/// Page count from the document's page tree
pub fn page_count(bytes: &[u8]) -> Option<usize> {
    let doc = lopdf::Document::load_mem(bytes).ok()?;
    let pages = doc.get_pages().len();
    (pages > 0).then_some(pages)
}

/// pdf-extract separates pages with form feeds
fn count_form_feeds(text: &str) -> usize {
    text.matches('\u{c}').count().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_an_error_not_a_panic() {
        let result = extract_pdf(b"%PDF-1.4\nthis is not really a pdf");
        assert!(matches!(result, Err(IngestError::Pdf(_))));
    }

    #[test]
    fn test_form_feed_fallback() {
        assert_eq!(count_form_feeds("one"), 1);
        assert_eq!(count_form_feeds("one\u{c}two\u{c}three"), 2);
    }

    #[test]
    fn test_page_count_of_garbage_is_none() {
        assert_eq!(page_count(b"not a pdf"), None);
    }
}

//! Tourbook Ingest
//!
//! The format-dispatching text-extraction layer: raw bytes plus a declared
//! file name and MIME type in, [`ExtractionResult`](tourbook_domain::ExtractionResult)
//! out.
//!
//! # Architecture
//!
//! ```text
//! bytes + name + mime → format::detect ─┬─ plain text → UTF-8 decode
//!                                       ├─ PDF        → pdf-extract + lopdf page count
//!                                       ├─ DOCX       → zip + quick-xml
//!                                       └─ image      → OcrEngine (tesseract)
//!                                            ↓
//!                                word count + low-text heuristic
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use tourbook_ingest::{FormatExtractor, IngestConfig};
//!
//! let extractor = FormatExtractor::with_tesseract(IngestConfig::default());
//! let result = extractor.extract(b"Show at The Fillmore", "offer.txt", Some("text/plain"));
//! assert!(result.error.is_none());
//! ```

#![warn(missing_docs)]

mod config;
mod docx;
mod error;
mod extractor;
pub mod format;
mod ocr;
mod pdf;
mod text;

pub use config::IngestConfig;
pub use docx::extract_docx;
pub use error::IngestError;
pub use extractor::{is_low_text, FormatExtractor};
pub use ocr::TesseractOcr;
pub use pdf::{extract_pdf, PdfText};
pub use text::{decode_utf8, normalize_text, word_count, EmailInput};

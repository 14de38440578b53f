//! End-to-end extraction over generated documents

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use proptest::prelude::*;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tourbook_domain::{DocumentFormat, ErrorKind, OcrEngine, OcrError};
use tourbook_ingest::{FormatExtractor, IngestConfig};
use zip::write::SimpleFileOptions;

struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(&self, _image: &[u8], _cancel: &CancellationToken) -> Result<String, OcrError> {
        Err(OcrError::Unavailable("disabled in tests".to_string()))
    }
}

fn extractor() -> FormatExtractor {
    FormatExtractor::new(IngestConfig::default(), Arc::new(NoOcr))
}

/// A PDF with one line of Courier text per page
fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_sparse_pdf_is_flagged_low_text() {
    let bytes = pdf_with_pages(&[
        "Show at The Fillmore",
        "March 3 2025",
        "Fee 5000",
    ]);
    let result = extractor().extract(&bytes, "offer.pdf", Some("application/pdf"));

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.format, Some(DocumentFormat::Pdf));
    assert_eq!(result.page_count, Some(3));
    assert!(result.text.contains("Fillmore"));
    assert!(result.is_low_text);
}

#[test]
fn test_mime_beats_misleading_extension() {
    let bytes = pdf_with_pages(&["Routing sheet"]);
    let result = extractor().extract(&bytes, "routing.txt", Some("application/pdf"));
    assert_eq!(result.format, Some(DocumentFormat::Pdf));
    assert!(result.text.contains("Routing"));
}

#[test]
fn test_corrupt_pdf_is_captured() {
    let result = extractor().extract(b"%PDF-1.7 truncated", "broken.pdf", None);
    assert!(result.error.is_some());
    assert_eq!(result.error_kind, Some(ErrorKind::ExtractionFailure));
    assert_eq!(result.text, "");
}

#[test]
fn test_docx_low_text_floor() {
    let short = docx_with_paragraphs(&["Artist: The Band", "Date: June 1 2025"]);
    let result = extractor().extract(&short, "offer.docx", None);
    assert!(result.error.is_none());
    assert_eq!(result.format, Some(DocumentFormat::Docx));
    assert!(result.text.contains("The Band"));
    assert!(result.is_low_text);

    let paragraph = "word ".repeat(50);
    let long = docx_with_paragraphs(&[paragraph.trim(); 5]);
    let result = extractor().extract(&long, "offer.docx", None);
    assert_eq!(result.word_count, Some(250));
    assert!(!result.is_low_text);
}

#[test]
fn test_image_without_ocr_engine() {
    let result = extractor().extract(b"\x89PNG\r\n", "flyer.png", Some("image/png"));
    assert_eq!(result.format, Some(DocumentFormat::Image));
    assert!(result.error.unwrap().contains("OCR engine unavailable"));
    assert!(!result.is_low_text);
}

#[test]
fn test_invalid_utf8_text() {
    let result = extractor().extract(&[0xc3, 0x28], "note.txt", None);
    assert!(result.error.unwrap().starts_with("Failed to decode text"));
    assert_eq!(result.text, "");
}

proptest! {
    #[test]
    fn extract_is_total(
        bytes in proptest::collection::vec(any::<u8>(), 0..512),
        name in prop::sample::select(vec!["a.pdf", "a.docx", "a.txt", "a.png", "a.bin", "noext"]),
        mime in prop::option::of(prop::sample::select(vec![
            "application/pdf",
            "text/plain",
            "image/jpeg",
            "application/octet-stream",
            "application/zip",
        ])),
    ) {
        let result = extractor().extract(&bytes, name, mime);
        if result.error.is_some() {
            prop_assert_eq!(result.text.as_str(), "");
        }
        if result.format == Some(DocumentFormat::Image) {
            prop_assert!(!result.is_low_text);
        }
        if result.error.is_none() && result.word_count == Some(0) {
            prop_assert!(result.is_low_text);
        }
    }
}

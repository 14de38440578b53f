//! DOCX to text conversion
//!
//! Reads `word/document.xml` out of the zip container and streams it,
//! keeping text runs and turning paragraph ends, breaks and tabs into
//! whitespace.

use crate::error::IngestError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract plain text from DOCX bytes
pub fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Docx(format!("Invalid zip: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| IngestError::Docx(format!("Missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Docx(format!("Read {}: {}", DOCUMENT_PART, e)))?;

    document_text(&xml)
}

/// Text content of a WordprocessingML document body
pub fn document_text(xml: &str) -> Result<String, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;
    // <w:tab/> inside <w:tabs> is a tab-stop definition, not content
    let mut in_tab_stops = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:tabs" => in_tab_stops = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" if !in_tab_stops => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| IngestError::Docx(format!("Bad text run: {}", e)))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(IngestError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
      <w:r><w:t>Artist:</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">The Band</w:t></w:r>
    </w:p>
    <w:p><w:r><w:t>Fee: $5,000 &amp; 80% after</w:t><w:br/><w:t>Doors 7pm</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_document_text() {
        let text = document_text(BODY).unwrap();
        assert_eq!(
            text,
            "Artist:\tThe Band\nFee: $5,000 & 80% after\nDoors 7pm\n"
        );
    }

    #[test]
    fn test_extract_docx_from_zip() {
        let text = extract_docx(&docx_with(BODY)).unwrap();
        assert!(text.contains("The Band"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx(b"plain bytes").unwrap_err();
        assert!(err.to_string().contains("Invalid zip"));
    }

    #[test]
    fn test_zip_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx(&bytes).unwrap_err();
        assert!(err.to_string().contains("Missing word/document.xml"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = document_text("<w:document><w:body><w:p></w:body>").unwrap_err();
        assert!(matches!(err, IngestError::Docx(_)));
    }
}

//! Format detection
//!
//! The declared MIME type wins over the file extension whenever it names a
//! format. `application/octet-stream` carries no information and is treated
//! as if no MIME type was given.

use crate::error::IngestError;
use tourbook_domain::DocumentFormat;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const TEXT_MIMES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/xhtml+xml",
    "message/rfc822",
];

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "csv", "json", "html", "htm", "xml", "eml",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tif", "tiff", "gif"];

/// Essence of a MIME type: parameters dropped, lowercased, `None` when it says nothing
fn essence(mime: &str) -> Option<String> {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence.is_empty() || essence == "application/octet-stream" {
        None
    } else {
        Some(essence)
    }
}

/// Map a MIME type to a format
///
/// # Examples
///
/// ```
/// use tourbook_ingest::format;
/// use tourbook_domain::DocumentFormat;
///
/// assert_eq!(format::from_mime("text/plain; charset=utf-8"), Some(DocumentFormat::PlainText));
/// assert_eq!(format::from_mime("application/PDF"), Some(DocumentFormat::Pdf));
/// assert_eq!(format::from_mime("application/zip"), None);
/// ```
pub fn from_mime(mime: &str) -> Option<DocumentFormat> {
    let mime = essence(mime)?;
    match mime.as_str() {
        "application/pdf" => Some(DocumentFormat::Pdf),
        DOCX_MIME => Some(DocumentFormat::Docx),
        m if m.starts_with("text/") || TEXT_MIMES.contains(&m) => Some(DocumentFormat::PlainText),
        m if m.starts_with("image/") => Some(DocumentFormat::Image),
        _ => None,
    }
}

/// File extension of `file_name`, lowercased, without the dot
pub fn extension(file_name: &str) -> Option<String> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Map a file extension (without the dot) to a format
pub fn from_extension(ext: &str) -> Option<DocumentFormat> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(DocumentFormat::Pdf),
        "docx" => Some(DocumentFormat::Docx),
        e if TEXT_EXTENSIONS.contains(&e) => Some(DocumentFormat::PlainText),
        e if IMAGE_EXTENSIONS.contains(&e) => Some(DocumentFormat::Image),
        _ => None,
    }
}

/// Decide which strategy handles a document
///
/// An informative MIME type decides on its own, even if the extension
/// disagrees. Only without one does the extension get a say.
pub fn detect(file_name: &str, mime: Option<&str>) -> Result<DocumentFormat, IngestError> {
    if let Some(mime) = mime.and_then(essence) {
        return from_mime(&mime).ok_or(IngestError::UnsupportedFormat(mime));
    }

    match extension(file_name) {
        Some(ext) => from_extension(&ext).ok_or(IngestError::UnsupportedFormat(ext)),
        None => Err(IngestError::UnsupportedFormat("unknown".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_wins_over_extension() {
        assert_eq!(
            detect("flyer.pdf", Some("image/png")).unwrap(),
            DocumentFormat::Image
        );
        assert_eq!(
            detect("notes.txt", Some("application/pdf")).unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_unsupported_mime_is_not_rescued_by_extension() {
        let err = detect("offer.pdf", Some("application/zip")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format: application/zip");
    }

    #[test]
    fn test_octet_stream_falls_back_to_extension() {
        assert_eq!(
            detect("Offer.DOCX", Some("application/octet-stream")).unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_extension_only() {
        assert_eq!(detect("routing.csv", None).unwrap(), DocumentFormat::PlainText);
        assert_eq!(detect("scan.JPEG", None).unwrap(), DocumentFormat::Image);
        assert_eq!(detect("dir/mail.eml", None).unwrap(), DocumentFormat::PlainText);
    }

    #[test]
    fn test_unsupported_tags() {
        assert_eq!(
            detect("archive.zip", None).unwrap_err().to_string(),
            "Unsupported format: zip"
        );
        assert_eq!(
            detect("README", None).unwrap_err().to_string(),
            "Unsupported format: unknown"
        );
        assert_eq!(
            detect(".bashrc", Some("")).unwrap_err().to_string(),
            "Unsupported format: unknown"
        );
    }

    #[test]
    fn test_text_like_mimes() {
        assert_eq!(from_mime("application/json"), Some(DocumentFormat::PlainText));
        assert_eq!(from_mime("text/html"), Some(DocumentFormat::PlainText));
        assert_eq!(from_mime(DOCX_MIME), Some(DocumentFormat::Docx));
        assert_eq!(from_mime("application/octet-stream"), None);
    }
}

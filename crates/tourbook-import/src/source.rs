//! What an import job reads from

use tourbook_domain::SourceFileMetadata;
use tourbook_ingest::EmailInput;

/// Input to an import job
///
/// Kept by the caller between `run` and `retry`; the job itself only stores
/// metadata and the extracted text.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    /// An uploaded file
    File {
        /// Raw file contents
        bytes: Vec<u8>,
        /// Declared file name
        file_name: String,
        /// Declared MIME type, if any
        mime_type: Option<String>,
    },
    /// A forwarded e-mail
    Email(EmailInput),
    /// Pasted text
    Text(String),
}

impl ImportSource {
    /// Build a file source
    pub fn file(
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Self {
        ImportSource::File {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// Metadata recorded on the job, files only
    pub fn metadata(&self) -> Option<SourceFileMetadata> {
        match self {
            ImportSource::File {
                bytes,
                file_name,
                mime_type,
            } => Some(SourceFileMetadata {
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
                size_bytes: bytes.len() as u64,
            }),
            ImportSource::Email(_) | ImportSource::Text(_) => None,
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            ImportSource::File {
                bytes, file_name, ..
            } => format!("file '{}' ({} bytes)", file_name, bytes.len()),
            ImportSource::Email(email) => format!("email '{}'", email.subject.trim()),
            ImportSource::Text(text) => format!("text ({} chars)", text.chars().count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata() {
        let source = ImportSource::file(b"hello".to_vec(), "offer.txt", Some("text/plain"));
        let metadata = source.metadata().unwrap();
        assert_eq!(metadata.file_name, "offer.txt");
        assert_eq!(metadata.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(metadata.size_bytes, 5);
    }

    #[test]
    fn test_non_file_sources_have_no_metadata() {
        assert!(ImportSource::Text("x".to_string()).metadata().is_none());
        let email = EmailInput::new("Hold", "agent@example.com", "body");
        assert!(ImportSource::Email(email).metadata().is_none());
    }

    #[test]
    fn test_describe() {
        let email = EmailInput::new(" Offer ", "agent@example.com", "body");
        assert_eq!(ImportSource::Email(email).describe(), "email 'Offer'");
        assert_eq!(ImportSource::Text("abc".to_string()).describe(), "text (3 chars)");
    }
}

//! Plain-text decoding, normalization and forwarded e-mail input

use crate::error::IngestError;
use serde::{Deserialize, Serialize};

const UTF8_BOM: &str = "\u{feff}";

/// Decode bytes as UTF-8, dropping a leading byte-order mark
pub fn decode_utf8(bytes: &[u8]) -> Result<String, IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::Decode(e.to_string()))?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Normalize extracted text before structuring
///
/// - CRLF and lone CR become LF
/// - control characters other than newline and tab are removed
/// - runs of horizontal whitespace collapse to one space
/// - every line is trimmed
/// - three or more consecutive newlines collapse to a single blank line
///
/// # Examples
///
/// ```
/// use tourbook_ingest::normalize_text;
///
/// let raw = "  Show at\tThe Fillmore \r\n\r\n\r\n\r\nMarch 3\u{0007} 2025  ";
/// assert_eq!(normalize_text(raw), "Show at The Fillmore\n\nMarch 3 2025");
/// ```
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0;
    for line in unified.split('\n') {
        let line = collapse_spaces(line);
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.trim().to_string()
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_control() {
            continue;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out
}

/// A forwarded e-mail, pre-split by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmailInput {
    /// Subject line
    pub subject: String,
    /// Sender as displayed ("Jane Booker <jane@example.com>")
    pub sender: String,
    /// Message body
    pub body: String,
}

impl EmailInput {
    /// Create a new e-mail input
    pub fn new(
        subject: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Render as a single plain-text document
    pub fn render(&self) -> String {
        format!(
            "Subject: {}\nFrom: {}\n\n{}",
            self.subject.trim(),
            self.sender.trim(),
            self.body
        )
    }
}

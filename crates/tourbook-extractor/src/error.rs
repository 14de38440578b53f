//! Degradation reasons for structured extraction
//!
//! Structured extraction never fails outright. When a field group cannot be
//! decoded, the group degrades to an empty, zero-confidence result carrying
//! one of these reasons.

use thiserror::Error;
use tourbook_domain::ErrorKind;

/// Why a field group produced no usable fields
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Degradation {
    /// No API key configured for the backend
    #[error("Backend unavailable: missing credentials")]
    MissingCredentials,

    /// Backend could not be reached or refused the request
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend did not answer in time
    #[error("Backend call timed out")]
    Timeout,

    /// Cancelled by the caller
    #[error("Backend call cancelled")]
    Cancelled,

    /// Backend answered with something that is not the requested JSON
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// Input text exceeds the configured maximum
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),
}

impl Degradation {
    /// Classification recorded on the job's error trail
    pub fn kind(&self) -> ErrorKind {
        match self {
            Degradation::MissingCredentials | Degradation::BackendUnavailable(_) => {
                ErrorKind::BackendUnavailable
            }
            Degradation::Timeout => ErrorKind::Timeout,
            Degradation::Cancelled => ErrorKind::Cancelled,
            Degradation::MalformedOutput(_) => ErrorKind::MalformedModelOutput,
            Degradation::TextTooLong(_, _) => ErrorKind::ExtractionFailure,
        }
    }
}

/// Failure to decode a backend response
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// No JSON value anywhere in the response
    #[error("no JSON found in response")]
    NoJson,

    /// JSON found but unusable even after normalization
    #[error("unexpected shape: {0}")]
    Shape(String),
}

impl From<DecodeError> for Degradation {
    fn from(e: DecodeError) -> Self {
        Degradation::MalformedOutput(e.to_string())
    }
}

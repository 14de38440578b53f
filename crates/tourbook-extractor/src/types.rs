//! Request and response types for structured extraction

use crate::error::Degradation;
use serde::{Deserialize, Serialize};
use std::fmt;
use tourbook_domain::{Candidate, CoreFields, DealFields, ExtractionMode, FieldValue};

/// Independent groups of fields, each extracted with its own backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Core show info and deal terms, one entry per show
    Show,
    /// Venue details
    Venue,
    /// People mentioned in the document
    Contacts,
}

impl FieldGroup {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Show => "show",
            FieldGroup::Venue => "venue",
            FieldGroup::Contacts => "contacts",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hard the prompt pushes the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// First-pass extraction
    #[default]
    Standard,
    /// Stricter second pass used by "improve"
    Improved,
}

impl PromptStyle {
    /// Extraction mode tag recorded for results produced with this style
    pub fn mode(&self) -> ExtractionMode {
        match self {
            PromptStyle::Standard => ExtractionMode::Llm,
            PromptStyle::Improved => ExtractionMode::LlmImproved,
        }
    }
}

/// Result of decoding one field group
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The backend answered and the answer decoded
    Decoded {
        /// Decoded fields, confidence already applied per field
        fields: T,
        /// Document-level confidence reported for the group, clamped
        confidence: f64,
    },
    /// Nothing usable; callers fall back to an empty, zero-confidence result
    Degraded {
        /// Why
        reason: Degradation,
    },
}

impl<T: Default> Outcome<T> {
    /// Fields if decoded, otherwise the empty default
    pub fn into_fields(self) -> T {
        match self {
            Outcome::Decoded { fields, .. } => fields,
            Outcome::Degraded { .. } => T::default(),
        }
    }
}

impl<T> Outcome<T> {
    /// Reported confidence, `0.0` when degraded
    pub fn confidence(&self) -> f64 {
        match self {
            Outcome::Decoded { confidence, .. } => *confidence,
            Outcome::Degraded { .. } => 0.0,
        }
    }

    /// Degradation reason, if any
    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            Outcome::Decoded { .. } => None,
            Outcome::Degraded { reason } => Some(reason),
        }
    }
}

/// One show as returned by the show group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShowFields {
    /// Core show info
    pub core: CoreFields,
    /// Deal terms
    pub deal: DealFields,
    /// Venue named alongside this particular show
    pub venue_name: FieldValue<String>,
    /// City named alongside this particular show
    pub city: FieldValue<String>,
}

/// A field group that degraded
#[derive(Debug, Clone, PartialEq)]
pub struct GroupIssue {
    /// Which group
    pub group: FieldGroup,
    /// Why it degraded
    pub reason: Degradation,
}

impl fmt::Display for GroupIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fields: {}", self.group, self.reason)
    }
}

/// Candidates derived from one document plus anything that went wrong
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateExtraction {
    /// At least one candidate, possibly empty with zero confidence
    pub candidates: Vec<Candidate>,
    /// Degraded field groups, in show/venue/contacts order
    pub issues: Vec<GroupIssue>,
    /// How the candidates were produced
    pub mode: ExtractionMode,
}

impl CandidateExtraction {
    /// Whether the caller abandoned the extraction
    pub fn was_cancelled(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.reason == Degradation::Cancelled)
    }
}

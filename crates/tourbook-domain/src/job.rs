//! Import job record and lifecycle
//!
//! ```text
//! pending → extracting → structuring → scoring → completed
//!                 │            │           ├──→ needs_review
//!                 └────────────┴───────────┴──→ failed
//!
//! retry:   failed | needs_review    → pending
//! improve: completed | needs_review → structuring
//! ```

use crate::candidate::Candidate;
use crate::confidence::min_confidence;
use crate::extraction::ExtractionSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Unique identifier for an import job (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(uuid::Uuid);

impl JobId {
    /// Generate a new UUIDv7-based JobId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a JobId from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use tourbook_domain::JobId;
    ///
    /// let id = JobId::new();
    /// let parsed = JobId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid job id: {}", e))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an import job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, nothing run yet (or reset by retry)
    Pending,
    /// Extracting text from the source
    Extracting,
    /// Deriving candidates from text
    Structuring,
    /// Scoring candidates against existing records
    Scoring,
    /// Finished with confident, duplicate-free candidates
    Completed,
    /// Finished, but a human must look (low confidence or duplicates)
    NeedsReview,
    /// Nothing usable could be produced
    Failed,
}

impl JobStatus {
    /// All states, in lifecycle order
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Pending,
        JobStatus::Extracting,
        JobStatus::Structuring,
        JobStatus::Scoring,
        JobStatus::Completed,
        JobStatus::NeedsReview,
        JobStatus::Failed,
    ];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Extracting => "extracting",
            JobStatus::Structuring => "structuring",
            JobStatus::Scoring => "scoring",
            JobStatus::Completed => "completed",
            JobStatus::NeedsReview => "needs_review",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse from the stable name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the job has stopped running
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::NeedsReview | JobStatus::Failed
        )
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Extracting)
                | (Pending, Failed)
                | (Extracting, Structuring)
                | (Extracting, Failed)
                | (Structuring, Scoring)
                | (Structuring, Failed)
                | (Scoring, Completed)
                | (Scoring, NeedsReview)
                | (Scoring, Failed)
                | (Failed, Pending)
                | (NeedsReview, Pending)
                | (Completed, Structuring)
                | (NeedsReview, Structuring)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Illegal lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// Current state
    pub from: JobStatus,
    /// Requested state
    pub to: JobStatus,
}

/// How the candidates of a job were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Deterministic pattern matching, no model involved
    RuleBased,
    /// Structured extraction through the language-model backend
    Llm,
    /// Language-model extraction with the stricter "improve" prompting
    LlmImproved,
}

impl ExtractionMode {
    /// Stable tag shown to users
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::RuleBased => "rule_based",
            ExtractionMode::Llm => "llm",
            ExtractionMode::LlmImproved => "llm_improved",
        }
    }

    /// Parse from the stable tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rule_based" => Some(ExtractionMode::RuleBased),
            "llm" => Some(ExtractionMode::Llm),
            "llm_improved" => Some(ExtractionMode::LlmImproved),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage an error was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Text extraction
    Extracting,
    /// Structured extraction
    Structuring,
    /// Duplicate scoring
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extracting => "extracting",
            Stage::Structuring => "structuring",
            Stage::Scoring => "scoring",
        })
    }
}

/// Error taxonomy for the job audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// MIME type / extension not recognized
    UnsupportedFormat,
    /// Format-specific library failed or produced garbage
    ExtractionFailure,
    /// Backend has no credentials or could not be reached
    BackendUnavailable,
    /// Backend answered with output that failed schema validation
    MalformedModelOutput,
    /// Backend or OCR did not answer in time
    Timeout,
    /// Caller abandoned the job mid-flight
    Cancelled,
}

impl ErrorKind {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::ExtractionFailure => "extraction_failure",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::MalformedModelOutput => "malformed_model_output",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only error audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    /// Attempt number the error belongs to (1-based)
    pub attempt: u32,
    /// Stage that recorded it
    pub stage: Stage,
    /// Classification
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Whether the error ended the attempt
    pub fatal: bool,
    /// When it was recorded
    pub at: DateTime<Utc>,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[attempt {}] {} ({}): {}",
            self.attempt, self.stage, self.kind, self.message
        )
    }
}

/// Metadata about the uploaded file, when the source was a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFileMetadata {
    /// Declared file name
    pub file_name: String,
    /// Declared MIME type
    pub mime_type: Option<String>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// The persisted unit of work for one ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    /// Unique identifier
    pub id: JobId,
    /// Owning organization
    pub org_id: String,
    /// Lifecycle state
    pub status: JobStatus,
    /// Text as extracted from the source
    pub raw_text: String,
    /// Text after whitespace/control-character normalization
    pub normalized_text: String,
    /// How the current candidates were produced
    pub extraction_mode: ExtractionMode,
    /// Current candidates
    pub candidates: Vec<Candidate>,
    /// Per-field-path confidence snapshot (`candidates[0].core.artist` → 0.8)
    pub confidence_map: BTreeMap<String, f64>,
    /// Append-only audit trail across all attempts
    pub errors: Vec<JobError>,
    /// Uploaded file metadata, absent for pasted text and e-mail
    pub source_file_metadata: Option<SourceFileMetadata>,
    /// Quality signals of the most recent text extraction
    pub extraction: Option<ExtractionSummary>,
    /// Number of run/retry/improve attempts so far
    pub attempt: u32,
    /// Minimum candidate confidence of the current candidates
    pub confidence: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl ImportJob {
    /// Create a new job in `pending`
    pub fn new(
        org_id: impl Into<String>,
        extraction_mode: ExtractionMode,
        source_file_metadata: Option<SourceFileMetadata>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            org_id: org_id.into(),
            status: JobStatus::Pending,
            raw_text: String::new(),
            normalized_text: String::new(),
            extraction_mode,
            candidates: Vec::new(),
            confidence_map: BTreeMap::new(),
            errors: Vec::new(),
            source_file_metadata,
            extraction: None,
            attempt: 0,
            confidence: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, refusing illegal transitions
    pub fn transition_to(&mut self, next: JobStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Begin a new attempt, returning its number
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.updated_at = Utc::now();
        self.attempt
    }

    /// Append an error to the audit trail for the current attempt
    pub fn record_error(
        &mut self,
        stage: Stage,
        kind: ErrorKind,
        message: impl Into<String>,
        fatal: bool,
    ) {
        self.errors.push(JobError {
            attempt: self.attempt,
            stage,
            kind,
            message: message.into(),
            fatal,
            at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Errors recorded during a given attempt
    pub fn errors_in_attempt(&self, attempt: u32) -> impl Iterator<Item = &JobError> {
        self.errors.iter().filter(move |e| e.attempt == attempt)
    }

    /// Whether the current attempt has recorded any error
    pub fn current_attempt_has_errors(&self) -> bool {
        self.errors_in_attempt(self.attempt).next().is_some()
    }

    /// The audit trail rendered as plain strings, oldest first
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Replace candidates and refresh the confidence snapshot and aggregate
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.refresh_confidence();
    }

    /// Rebuild `confidence_map` and `confidence` from the current candidates
    pub fn refresh_confidence(&mut self) {
        self.confidence_map = self
            .candidates
            .iter()
            .enumerate()
            .flat_map(|(i, c)| {
                c.field_confidences()
                    .into_iter()
                    .map(move |(path, conf)| (format!("candidates[{}].{}", i, path), conf))
            })
            .collect();
        self.confidence = min_confidence(self.candidates.iter().map(|c| c.confidence));
        self.updated_at = Utc::now();
    }

    /// Whether any candidate carries a duplicate match
    pub fn has_duplicates(&self) -> bool {
        self.candidates.iter().any(|c| !c.duplicates.is_empty())
    }
}

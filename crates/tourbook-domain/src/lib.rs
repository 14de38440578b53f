//! Tourbook Domain Layer
//!
//! Core value types and trait seams for the document/email ingestion pipeline.
//! Every other crate in the workspace depends on this one; it performs no I/O.
//!
//! ## Key Concepts
//!
//! - **FieldValue**: an extracted value paired with a confidence in `[0, 1]`
//! - **Candidate**: one proposed show booking derived from a source document
//! - **DuplicateMatch**: a scored pointer from a candidate to an existing record
//! - **ExtractionResult**: raw text plus quality signals from a file
//! - **ImportJob**: the persisted, reviewable unit of work tying it all together
//!
//! ## Architecture
//!
//! - Pure data and pure functions only
//! - Infrastructure (LLM backends, OCR, SQLite) lives in other crates
//! - Trait definitions for all external interactions live in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod confidence;
pub mod dates;
pub mod extraction;
pub mod field;
pub mod job;
pub mod traits;

// Re-exports for convenience
pub use candidate::{
    Candidate, CandidateId, ContactFields, CoreFields, DealFields, DuplicateMatch,
    ExistingRecord, VenueFields,
};
pub use confidence::{clamp_confidence, confidence_from_json, min_confidence};
pub use dates::normalize_date;
pub use extraction::{DocumentFormat, ExtractionResult, ExtractionSummary};
pub use field::FieldValue;
pub use job::{
    ErrorKind, ExtractionMode, ImportJob, InvalidTransition, JobError, JobId, JobStatus,
    SourceFileMetadata, Stage,
};
pub use traits::{ImportJobStore, LlmProvider, OcrEngine, OcrError};

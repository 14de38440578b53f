//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::job::{ImportJob, JobId};
use async_trait::async_trait;
use std::fmt::Display;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (tourbook-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: Display + Send;

    /// Generate text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured (JSON) output
    async fn generate_structured(&self, prompt: &str, schema: &str)
        -> Result<String, Self::Error>;

    /// Whether the provider has what it needs to make a call at all
    ///
    /// Returning `false` lets callers skip the request and report a
    /// missing-credentials degradation instead of a network failure.
    fn has_credentials(&self) -> bool {
        true
    }
}

/// OCR failure modes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    /// The OCR engine is not installed or could not be started
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but failed
    #[error("OCR failed: {0}")]
    Failed(String),

    /// The engine did not finish in time
    #[error("OCR timed out")]
    Timeout,

    /// Cancelled by the caller
    #[error("OCR cancelled")]
    Cancelled,
}

/// Trait for optical character recognition over raster images
///
/// Implemented by the infrastructure layer (tourbook-ingest). Implementations
/// must observe `cancel` and stop work promptly once it fires.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded image (PNG, JPEG, TIFF, ...)
    fn recognize(&self, image: &[u8], cancel: &CancellationToken) -> Result<String, OcrError>;
}

/// Trait for persisting import jobs
///
/// Implemented by the infrastructure layer (tourbook-store)
pub trait ImportJobStore {
    /// Error type for store operations
    type Error;

    /// Insert or replace a job
    fn save(&mut self, job: &ImportJob) -> Result<(), Self::Error>;

    /// Load a job by ID
    fn load(&self, id: JobId) -> Result<Option<ImportJob>, Self::Error>;

    /// List jobs belonging to an organization, newest first
    fn list_for_org(&self, org_id: &str) -> Result<Vec<ImportJob>, Self::Error>;
}

//! Tourbook Import
//!
//! Orchestrates one document import end to end: text extraction, structured
//! extraction into candidate show bookings, duplicate scoring, and the job
//! lifecycle that ties them together.
//!
//! # Architecture
//!
//! ```text
//! ImportSource → FormatExtractor → normalize_text
//!                                      ↓
//!                 StructuredExtractor | RuleBasedExtractor
//!                                      ↓
//!                              DuplicateScorer → ImportJob
//! ```
//!
//! The job decides the outcome. A component failure becomes an entry on the
//! job's error trail; only a text extraction that produced nothing at all,
//! or cancellation, fails the job.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use tourbook_import::{ImportConfig, ImportPipeline, ImportSource};
//! use tourbook_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ImportPipeline::with_tesseract(
//!     ImportConfig::default(),
//!     Arc::new(MockProvider::default()),
//! );
//!
//! let source = ImportSource::Text("Show at The Fillmore, March 3 2025".to_string());
//! let mut job = pipeline.submit("org-1", &source);
//! pipeline.run(&mut job, &source, &[], &CancellationToken::new()).await?;
//!
//! println!("{}: {} candidates", job.status, job.candidates.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod source;

pub use config::ImportConfig;
pub use error::ImportError;
pub use pipeline::ImportPipeline;
pub use source::ImportSource;

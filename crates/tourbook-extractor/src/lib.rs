//! Tourbook Extractor
//!
//! Converts normalized document text into candidate show bookings using an
//! LLM backend, with a regex fallback when no backend is configured.
//!
//! # Overview
//!
//! Three independent field groups are requested from the backend in
//! parallel: shows (core fields and deal terms), venue, and contacts. Each
//! group degrades on its own: missing credentials, timeouts, network errors
//! and unusable model output all turn into empty, zero-confidence fields
//! plus a [`Degradation`] reason, never an error.
//!
//! # Architecture
//!
//! ```text
//! text ─┬─ show prompt     → LLM → decode_shows   ─┐
//!       ├─ venue prompt    → LLM → decode_venue   ─┼→ Candidate per show
//!       └─ contacts prompt → LLM → decode_contacts ┘
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use tourbook_extractor::{ExtractorConfig, PromptStyle, StructuredExtractor};
//! use tourbook_llm::MockProvider;
//!
//! # async fn example() {
//! let llm = Arc::new(MockProvider::new(r#"{"shows": [], "confidence": 0.0}"#));
//! let extractor = StructuredExtractor::new(llm, ExtractorConfig::default());
//!
//! let result = extractor
//!     .extract_candidates("The Band at The Fillmore", PromptStyle::Standard, &CancellationToken::new())
//!     .await;
//!
//! println!("Candidates: {}", result.candidates.len());
//! println!("Degraded groups: {}", result.issues.len());
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
pub mod parser;
mod prompt;
mod rules;
mod types;


pub use config::ExtractorConfig;
pub use error::{DecodeError, Degradation};
pub use extractor::StructuredExtractor;
pub use prompt::PromptBuilder;
pub use rules::{RuleBasedExtractor, RULE_CONFIDENCE};
pub use types::{
    CandidateExtraction, FieldGroup, GroupIssue, Outcome, PromptStyle, ShowFields,
};

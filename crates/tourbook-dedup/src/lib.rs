//! Tourbook Dedup
//!
//! Flags existing show records that look like the same booking as a newly
//! extracted candidate.
//!
//! Each record gets a weighted composite score from date equality (the
//! heaviest signal), title, venue and city. Fields missing on either side
//! are neutral. Records at or above the acceptance threshold come back
//! sorted by score, each naming the fields that matched.
//!
//! # Examples
//!
//! ```
//! use tourbook_dedup::{DuplicateScorer, ScorerConfig};
//! use tourbook_domain::{Candidate, ExistingRecord};
//!
//! let scorer = DuplicateScorer::new(ScorerConfig::default());
//! let existing = vec![ExistingRecord {
//!     id: "show-1".to_string(),
//!     title: "Summer Tour".to_string(),
//!     date: Some("2025-06-01".to_string()),
//!     venue_name: None,
//!     city: Some("Austin".to_string()),
//! }];
//!
//! // Nothing extracted, nothing flagged
//! assert!(scorer.score(&Candidate::empty(), &existing).is_empty());
//! ```

#![warn(missing_docs)]

mod config;
mod scorer;

pub use config::ScorerConfig;
pub use scorer::{normalize_name, DuplicateScorer, RecordScore};

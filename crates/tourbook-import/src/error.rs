//! Error types for the import pipeline

use thiserror::Error;
use tourbook_domain::{InvalidTransition, JobStatus};

/// Import pipeline errors
///
/// Extraction, structuring and scoring problems never surface here; they are
/// recorded on the job. Only lifecycle misuse is an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The operation is not allowed from the job's current status
    #[error("Cannot {operation} a job in status {from}")]
    InvalidTransition {
        /// Status the job was in
        from: JobStatus,
        /// Operation that was refused ("run", "retry", "improve")
        operation: &'static str,
    },

    /// An internal step broke the lifecycle table
    #[error(transparent)]
    Lifecycle(#[from] InvalidTransition),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::InvalidTransition {
            from: JobStatus::Pending,
            operation: "improve",
        };
        assert_eq!(err.to_string(), "Cannot improve a job in status pending");

        let err = ImportError::from(InvalidTransition {
            from: JobStatus::Completed,
            to: JobStatus::Extracting,
        });
        assert_eq!(err.to_string(), "Invalid transition: completed -> extracting");
    }
}

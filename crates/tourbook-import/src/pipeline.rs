//! The import job state machine

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::source::ImportSource;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tourbook_dedup::DuplicateScorer;
use tourbook_domain::{
    ErrorKind, ExistingRecord, ExtractionMode, ExtractionResult, ImportJob, JobStatus,
    LlmProvider, OcrEngine, Stage,
};
use tourbook_extractor::{
    CandidateExtraction, PromptStyle, RuleBasedExtractor, StructuredExtractor,
};
use tourbook_ingest::{normalize_text, FormatExtractor};
use tracing::{info, warn};

/// Runs import jobs end to end
///
/// ```text
/// pending → extracting → structuring → scoring → completed | needs_review
///                ↘ failed       ↘ failed
/// ```
///
/// `retry` resets a failed or reviewed job to `pending` and runs it again;
/// `improve` re-runs structuring and scoring on the text already extracted.
pub struct ImportPipeline<L> {
    config: ImportConfig,
    ingest: FormatExtractor,
    structured: StructuredExtractor<L>,
    rules: RuleBasedExtractor,
    scorer: DuplicateScorer,
}

impl<L: LlmProvider> ImportPipeline<L> {
    /// Create a pipeline over an explicit backend and OCR engine
    pub fn new(config: ImportConfig, llm_provider: Arc<L>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            ingest: FormatExtractor::new(config.ingest.clone(), ocr),
            structured: StructuredExtractor::new(llm_provider, config.extractor.clone()),
            rules: RuleBasedExtractor::new(),
            scorer: DuplicateScorer::new(config.scorer.clone()),
            config,
        }
    }

    /// Create a pipeline using the Tesseract command-line OCR engine
    pub fn with_tesseract(config: ImportConfig, llm_provider: Arc<L>) -> Self {
        Self {
            ingest: FormatExtractor::with_tesseract(config.ingest.clone()),
            structured: StructuredExtractor::new(llm_provider, config.extractor.clone()),
            rules: RuleBasedExtractor::new(),
            scorer: DuplicateScorer::new(config.scorer.clone()),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Create a pending job for `source`
    pub fn submit(&self, org_id: &str, source: &ImportSource) -> ImportJob {
        let job = ImportJob::new(org_id, self.config.mode, source.metadata());
        info!(job_id = %job.id, org_id, "Submitted import of {}", source.describe());
        job
    }

    /// Run a pending job through extraction, structuring and scoring
    ///
    /// `existing` is the organization's snapshot of show records for
    /// duplicate detection. Problems along the way are recorded on the job;
    /// only calling this on a job that is not pending is an error.
    pub async fn run(
        &self,
        job: &mut ImportJob,
        source: &ImportSource,
        existing: &[ExistingRecord],
        cancel: &CancellationToken,
    ) -> Result<(), ImportError> {
        if job.status != JobStatus::Pending {
            return Err(ImportError::InvalidTransition {
                from: job.status,
                operation: "run",
            });
        }

        let attempt = job.begin_attempt();
        info!(job_id = %job.id, attempt, "Starting import attempt");

        advance(job, JobStatus::Extracting)?;
        if cancel.is_cancelled() {
            return cancelled(job, Stage::Extracting);
        }

        let result = self.extract(source, cancel).await;
        job.raw_text = result.text.clone();
        job.normalized_text = normalize_text(&result.text);
        job.extraction = Some(result.summary());

        if cancel.is_cancelled() || result.error_kind == Some(ErrorKind::Cancelled) {
            return cancelled(job, Stage::Extracting);
        }

        if let Some(error) = &result.error {
            let kind = result.error_kind.unwrap_or(ErrorKind::ExtractionFailure);
            let fatal = result.is_fatal();
            job.record_error(Stage::Extracting, kind, error.clone(), fatal);
            if fatal {
                warn!(job_id = %job.id, "Extraction failed with no text: {}", error);
                return advance(job, JobStatus::Failed);
            }
        }

        if result.is_low_text {
            warn!(
                job_id = %job.id,
                words = ?result.word_count,
                "Low-text document, candidates will likely need review"
            );
        }

        advance(job, JobStatus::Structuring)?;
        self.structure_and_score(job, PromptStyle::Standard, existing, cancel)
            .await
    }

    /// Reset a failed or reviewed job and run it again from scratch
    ///
    /// Earlier errors stay on the job; new ones are tagged with the new
    /// attempt number.
    pub async fn retry(
        &self,
        job: &mut ImportJob,
        source: &ImportSource,
        existing: &[ExistingRecord],
        cancel: &CancellationToken,
    ) -> Result<(), ImportError> {
        if !matches!(job.status, JobStatus::Failed | JobStatus::NeedsReview) {
            return Err(ImportError::InvalidTransition {
                from: job.status,
                operation: "retry",
            });
        }

        advance(job, JobStatus::Pending)?;
        job.raw_text.clear();
        job.normalized_text.clear();
        job.extraction = None;
        job.extraction_mode = self.config.mode;
        job.set_candidates(Vec::new());

        self.run(job, source, existing, cancel).await
    }

    /// Re-run structuring and scoring with stronger prompting
    ///
    /// Reuses the job's extracted text; the source is not read again.
    pub async fn improve(
        &self,
        job: &mut ImportJob,
        existing: &[ExistingRecord],
        cancel: &CancellationToken,
    ) -> Result<(), ImportError> {
        if !matches!(job.status, JobStatus::Completed | JobStatus::NeedsReview) {
            return Err(ImportError::InvalidTransition {
                from: job.status,
                operation: "improve",
            });
        }

        let attempt = job.begin_attempt();
        info!(job_id = %job.id, attempt, "Starting improve pass");

        advance(job, JobStatus::Structuring)?;
        self.structure_and_score(job, PromptStyle::Improved, existing, cancel)
            .await
    }

    async fn extract(&self, source: &ImportSource, cancel: &CancellationToken) -> ExtractionResult {
        match source {
            ImportSource::File {
                bytes,
                file_name,
                mime_type,
            } => {
                self.ingest
                    .extract_async(
                        bytes.clone(),
                        file_name.clone(),
                        mime_type.clone(),
                        cancel.clone(),
                    )
                    .await
            }
            ImportSource::Email(email) => self.ingest.extract_email(email),
            ImportSource::Text(text) => self.ingest.extract_text(text),
        }
    }

    async fn structure_and_score(
        &self,
        job: &mut ImportJob,
        style: PromptStyle,
        existing: &[ExistingRecord],
        cancel: &CancellationToken,
    ) -> Result<(), ImportError> {
        let extraction = self.structure(&job.normalized_text, style, cancel).await;

        if extraction.was_cancelled() || cancel.is_cancelled() {
            return cancelled(job, Stage::Structuring);
        }

        for issue in &extraction.issues {
            job.record_error(Stage::Structuring, issue.reason.kind(), issue.to_string(), false);
        }
        job.extraction_mode = extraction.mode;

        advance(job, JobStatus::Scoring)?;

        let mut candidates = extraction.candidates;
        let duplicates = self.scorer.annotate(&mut candidates, existing);
        job.set_candidates(candidates);

        info!(
            job_id = %job.id,
            candidates = job.candidates.len(),
            duplicates,
            confidence = job.confidence,
            "Scoring complete"
        );

        let outcome = if job.confidence >= self.config.min_review_confidence
            && !job.has_duplicates()
            && !job.current_attempt_has_errors()
        {
            JobStatus::Completed
        } else {
            JobStatus::NeedsReview
        };
        advance(job, outcome)
    }

    async fn structure(
        &self,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> CandidateExtraction {
        match self.config.mode {
            ExtractionMode::RuleBased => self.rules.extract(text),
            ExtractionMode::Llm | ExtractionMode::LlmImproved => {
                self.structured.extract_candidates(text, style, cancel).await
            }
        }
    }
}

/// Apply a lifecycle transition and log it
fn advance(job: &mut ImportJob, next: JobStatus) -> Result<(), ImportError> {
    let from = job.status;
    job.transition_to(next)?;
    info!(job_id = %job.id, %from, to = %next, "Job transition");
    Ok(())
}

fn cancelled(job: &mut ImportJob, stage: Stage) -> Result<(), ImportError> {
    warn!(job_id = %job.id, %stage, "Import cancelled");
    job.record_error(stage, ErrorKind::Cancelled, "Import cancelled", true);
    advance(job, JobStatus::Failed)
}

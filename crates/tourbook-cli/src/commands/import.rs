//! Import command implementation.

use super::{build_pipeline, cancel_on_ctrl_c, load_existing, read_source};
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tourbook_domain::{ExistingRecord, ImportJobStore, LlmProvider};
use tourbook_import::{ImportPipeline, ImportSource};
use tourbook_store::SqliteJobStore;

/// Execute the import command.
pub async fn execute_import(
    args: ImportArgs,
    config: &Config,
    store: &mut SqliteJobStore,
    formatter: &Formatter,
) -> Result<()> {
    let source = read_source(&args.file, args.mime.as_deref())?;
    let existing = load_existing(args.existing.as_deref())?;
    let org_id = args.org.as_deref().unwrap_or(&config.settings.org_id);
    let pipeline = build_pipeline(config, args.mode.map(Into::into));

    submit_and_run(&pipeline, store, org_id, &source, &existing, formatter).await
}

/// Submit a new job, run it, and persist it before and after the run.
pub(crate) async fn submit_and_run<L: LlmProvider>(
    pipeline: &ImportPipeline<L>,
    store: &mut SqliteJobStore,
    org_id: &str,
    source: &ImportSource,
    existing: &[ExistingRecord],
    formatter: &Formatter,
) -> Result<()> {
    let mut job = pipeline.submit(org_id, source);
    store.save(&job)?;
    println!("{}", formatter.info(&format!("Importing {}", source.describe())));

    let cancel = cancel_on_ctrl_c();
    pipeline.run(&mut job, source, existing, &cancel).await?;
    store.save(&job)?;

    println!("{}", formatter.job_outcome(&job));
    println!("{}", formatter.format_job(&job)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tourbook_domain::{JobStatus, OcrEngine, OcrError};
    use tourbook_import::ImportConfig;
    use tourbook_llm::MockProvider;

    struct NoOcr;

    impl OcrEngine for NoOcr {
        fn recognize(
            &self,
            _image: &[u8],
            _cancel: &CancellationToken,
        ) -> std::result::Result<String, OcrError> {
            Err(OcrError::Unavailable("no OCR in tests".to_string()))
        }
    }

    #[tokio::test]
    async fn test_submit_and_run_persists_outcome() {
        let pipeline = ImportPipeline::new(
            ImportConfig::rule_based(),
            Arc::new(MockProvider::default()),
            Arc::new(NoOcr),
        );
        let mut store = SqliteJobStore::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let source = ImportSource::Text(
            "Subject: Hold\nArtist: The Midnight Owls\nShow on 2025-03-03 at The Fillmore".to_string(),
        );

        submit_and_run(&pipeline, &mut store, "acme", &source, &[], &formatter)
            .await
            .unwrap();

        let jobs = store.list_for_org("acme").unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::NeedsReview);
        assert_eq!(jobs[0].candidates[0].core.date.as_str(), Some("2025-03-03"));
    }
}

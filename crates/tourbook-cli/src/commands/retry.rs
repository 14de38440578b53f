//! Retry command implementation.

use super::{build_pipeline, cancel_on_ctrl_c, find_job, load_existing, read_source};
use crate::cli::RetryArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tourbook_domain::ImportJobStore;
use tourbook_store::SqliteJobStore;

/// Execute the retry command.
///
/// The job only keeps metadata of its source, so the file is read again.
pub async fn execute_retry(
    args: RetryArgs,
    config: &Config,
    store: &mut SqliteJobStore,
    formatter: &Formatter,
) -> Result<()> {
    let mut job = find_job(store, &args.job_id)?;
    let source = read_source(&args.file, args.mime.as_deref())?;
    let existing = load_existing(args.existing.as_deref())?;
    let pipeline = build_pipeline(config, args.mode.map(Into::into));

    if let (Some(recorded), Some(current)) = (&job.source_file_metadata, source.metadata()) {
        if recorded.size_bytes != current.size_bytes || recorded.file_name != current.file_name {
            println!(
                "{}",
                formatter.warning(&format!(
                    "Source differs from the original upload ({})",
                    recorded.file_name
                ))
            );
        }
    }

    let cancel = cancel_on_ctrl_c();
    pipeline.retry(&mut job, &source, &existing, &cancel).await?;
    store.save(&job)?;

    println!("{}", formatter.job_outcome(&job));
    println!("{}", formatter.format_job(&job)?);
    Ok(())
}

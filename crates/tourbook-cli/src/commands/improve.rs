//! Improve command implementation.

use super::{build_pipeline, cancel_on_ctrl_c, find_job, load_existing};
use crate::cli::ImproveArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tourbook_domain::ImportJobStore;
use tourbook_store::SqliteJobStore;

/// Execute the improve command.
pub async fn execute_improve(
    args: ImproveArgs,
    config: &Config,
    store: &mut SqliteJobStore,
    formatter: &Formatter,
) -> Result<()> {
    let mut job = find_job(store, &args.job_id)?;
    let existing = load_existing(args.existing.as_deref())?;
    let pipeline = build_pipeline(config, None);

    let cancel = cancel_on_ctrl_c();
    pipeline.improve(&mut job, &existing, &cancel).await?;
    store.save(&job)?;

    println!("{}", formatter.job_outcome(&job));
    println!("{}", formatter.format_job(&job)?);
    Ok(())
}

//! Jobs command implementation.

use crate::cli::JobsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tourbook_domain::ImportJobStore;
use tourbook_store::SqliteJobStore;

/// Execute the jobs command.
pub fn execute_jobs(
    args: JobsArgs,
    config: &Config,
    store: &SqliteJobStore,
    formatter: &Formatter,
) -> Result<()> {
    let org_id = args.org.as_deref().unwrap_or(&config.settings.org_id);
    let jobs = store.list_for_org(org_id)?;
    println!("{}", formatter.format_jobs(&jobs)?);
    Ok(())
}

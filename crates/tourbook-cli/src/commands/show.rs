//! Show command implementation.

use super::find_job;
use crate::cli::ShowArgs;
use crate::error::Result;
use crate::output::Formatter;
use tourbook_store::SqliteJobStore;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, store: &SqliteJobStore, formatter: &Formatter) -> Result<()> {
    let job = find_job(store, &args.job_id)?;
    println!("{}", formatter.format_job(&job)?);
    Ok(())
}

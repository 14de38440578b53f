//! Email command implementation.

use super::import::submit_and_run;
use super::{build_pipeline, load_existing};
use crate::cli::EmailArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use tourbook_import::ImportSource;
use tourbook_ingest::EmailInput;
use tourbook_store::SqliteJobStore;

/// Execute the email command.
pub async fn execute_email(
    args: EmailArgs,
    config: &Config,
    store: &mut SqliteJobStore,
    formatter: &Formatter,
) -> Result<()> {
    let body = fs::read_to_string(&args.body_file)?;
    if args.subject.trim().is_empty() && body.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "E-mail has neither subject nor body".to_string(),
        ));
    }

    let source = ImportSource::Email(EmailInput::new(args.subject, args.from, body));
    let existing = load_existing(args.existing.as_deref())?;
    let org_id = args.org.as_deref().unwrap_or(&config.settings.org_id);
    let pipeline = build_pipeline(config, args.mode.map(Into::into));

    submit_and_run(&pipeline, store, org_id, &source, &existing, formatter).await
}

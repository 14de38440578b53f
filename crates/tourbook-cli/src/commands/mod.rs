//! Command implementations.

pub mod email;
pub mod import;
pub mod improve;
pub mod jobs;
pub mod retry;
pub mod show;

pub use self::email::execute_email;
pub use self::import::execute_import;
pub use self::improve::execute_improve;
pub use self::jobs::execute_jobs;
pub use self::retry::execute_retry;
pub use self::show::execute_show;

use crate::config::Config;
use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tourbook_domain::{ExistingRecord, ExtractionMode, ImportJob, ImportJobStore, JobId};
use tourbook_import::{ImportPipeline, ImportSource};
use tourbook_llm::OpenAiProvider;
use tourbook_store::SqliteJobStore;
use tracing::warn;

/// Build the pipeline from configuration, optionally overriding the mode.
pub(crate) fn build_pipeline(
    config: &Config,
    mode: Option<ExtractionMode>,
) -> ImportPipeline<OpenAiProvider> {
    let mut import = config.import.clone();
    if let Some(mode) = mode {
        import.mode = mode;
    }
    let provider = Arc::new(OpenAiProvider::new(config.credentials()));
    ImportPipeline::with_tesseract(import, provider)
}

/// Read a file into an import source.
pub(crate) fn read_source(path: &Path, mime: Option<&str>) -> Result<ImportSource> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidInput(format!("Not a file: {}", path.display())))?;
    Ok(ImportSource::file(bytes, file_name, mime))
}

/// Load the existing-record snapshot, or an empty one.
pub(crate) fn load_existing(path: Option<&Path>) -> Result<Vec<ExistingRecord>> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(Vec::new()),
    }
}

/// Load a stored job by its ID string.
pub(crate) fn find_job(store: &SqliteJobStore, id: &str) -> Result<ImportJob> {
    let job_id = JobId::from_string(id).map_err(CliError::InvalidInput)?;
    store
        .load(job_id)?
        .ok_or_else(|| CliError::JobNotFound(id.to_string()))
}

/// Token cancelled when the user presses Ctrl-C.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling the running import");
            token.cancel();
        }
    });
    cancel
}

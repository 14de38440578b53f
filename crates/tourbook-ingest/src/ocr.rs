//! Tesseract OCR engine
//!
//! Runs the `tesseract` command-line tool on a temporary copy of the image.
//! The child is polled so it can be killed on timeout or cancellation.

use crate::config::IngestConfig;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tourbook_domain::{OcrEngine, OcrError};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// OCR engine backed by the tesseract CLI
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    languages: String,
    timeout: Duration,
}

impl TesseractOcr {
    /// Create an engine from explicit settings
    pub fn new(binary: impl Into<PathBuf>, languages: &[String], timeout: Duration) -> Self {
        let languages = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };
        Self {
            binary: binary.into(),
            languages,
            timeout,
        }
    }

    /// Create an engine from the ingest configuration
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(
            &config.tesseract_path,
            &config.ocr_languages,
            config.ocr_timeout(),
        )
    }
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

fn wait_for_child(
    child: &mut Child,
    timeout: Duration,
    cancel: &CancellationToken,
) -> std::io::Result<Wait> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Wait::Exited(status));
        }
        if cancel.is_cancelled() {
            return Ok(Wait::Cancelled);
        }
        if start.elapsed() >= timeout {
            return Ok(Wait::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &[u8], cancel: &CancellationToken) -> Result<String, OcrError> {
        if cancel.is_cancelled() {
            return Err(OcrError::Cancelled);
        }

        let dir = tempfile::tempdir()
            .map_err(|e| OcrError::Failed(format!("temp dir: {}", e)))?;
        let input = dir.path().join("input");
        let output_base = dir.path().join("output");
        std::fs::write(&input, image).map_err(|e| OcrError::Failed(format!("temp file: {}", e)))?;

        let mut child = Command::new(&self.binary)
            .arg(&input)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.languages)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                IoErrorKind::NotFound => {
                    OcrError::Unavailable(format!("{} not found", self.binary.display()))
                }
                _ => OcrError::Unavailable(e.to_string()),
            })?;

        let outcome = wait_for_child(&mut child, self.timeout, cancel);
        let status = match outcome {
            Ok(Wait::Exited(status)) => status,
            Ok(Wait::TimedOut) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OcrError::Timeout);
            }
            Ok(Wait::Cancelled) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OcrError::Cancelled);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OcrError::Failed(format!("wait failed: {}", e)));
            }
        };

        if !status.success() {
            return Err(OcrError::Failed(format!("tesseract exited with {}", status)));
        }

        let text = std::fs::read_to_string(output_base.with_extension("txt"))
            .map_err(|e| OcrError::Failed(format!("reading output: {}", e)))?;
        debug!(chars = text.len(), "OCR finished");
        Ok(text)
    }
}

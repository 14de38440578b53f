//! Tourbook Store
//!
//! SQLite persistence for import jobs.
//!
//! Scalar job fields get their own columns; nested data (candidates, the
//! error trail, file metadata, extraction summary) is stored as JSON text so
//! a loaded job compares equal to the one that was saved.

#![warn(missing_docs)]

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tourbook_domain::{ExtractionMode, ImportJob, ImportJobStore, JobId, JobStatus};
use tracing::debug;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A nested value could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be turned back into a job
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const SELECT_JOB: &str = "SELECT id, org_id, status, extraction_mode, raw_text, normalized_text,
        candidates, confidence_map, errors, source_file_metadata, extraction,
        attempt, confidence, created_at, updated_at
     FROM import_jobs";

/// SQLite-backed implementation of [`ImportJobStore`]
///
/// SQLite connections are not thread-safe; share a store across tasks behind
/// a mutex or open one per task.
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Open (or create) a job database at `path`
    ///
    /// Pass `":memory:"` for a throwaway database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }
}

impl ImportJobStore for SqliteJobStore {
    type Error = StoreError;

    fn save(&mut self, job: &ImportJob) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO import_jobs (id, org_id, status, extraction_mode, raw_text,
                normalized_text, candidates, confidence_map, errors, source_file_metadata,
                extraction, attempt, confidence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                org_id = excluded.org_id,
                status = excluded.status,
                extraction_mode = excluded.extraction_mode,
                raw_text = excluded.raw_text,
                normalized_text = excluded.normalized_text,
                candidates = excluded.candidates,
                confidence_map = excluded.confidence_map,
                errors = excluded.errors,
                source_file_metadata = excluded.source_file_metadata,
                extraction = excluded.extraction,
                attempt = excluded.attempt,
                confidence = excluded.confidence,
                updated_at = excluded.updated_at",
            params![
                job.id.to_string(),
                job.org_id,
                job.status.as_str(),
                job.extraction_mode.as_str(),
                job.raw_text,
                job.normalized_text,
                to_json(&job.candidates)?,
                to_json(&job.confidence_map)?,
                to_json(&job.errors)?,
                job.source_file_metadata.as_ref().map(to_json).transpose()?,
                job.extraction.as_ref().map(to_json).transpose()?,
                job.attempt,
                job.confidence,
                timestamp(&job.created_at),
                timestamp(&job.updated_at),
            ],
        )?;

        debug!(job_id = %job.id, status = %job.status, "Saved import job");
        Ok(())
    }

    fn load(&self, id: JobId) -> Result<Option<ImportJob>, Self::Error> {
        let job = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_JOB),
                params![id.to_string()],
                row_to_job,
            )
            .optional()?;
        Ok(job)
    }

    fn list_for_org(&self, org_id: &str) -> Result<Vec<ImportJob>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE org_id = ?1 ORDER BY created_at DESC, id DESC",
            SELECT_JOB
        ))?;

        let jobs = stmt
            .query_map(params![org_id], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }
}

/// Fixed-width RFC 3339, so text order matches time order
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

fn invalid(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(StoreError::InvalidData(message)),
    )
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_json_column<T: DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| {
        serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<ImportJob> {
    let id: String = row.get(0)?;
    let status: String = row.get(2)?;
    let mode: String = row.get(3)?;

    Ok(ImportJob {
        id: JobId::from_string(&id).map_err(|e| invalid(0, e))?,
        org_id: row.get(1)?,
        status: JobStatus::parse(&status)
            .ok_or_else(|| invalid(2, format!("unknown status '{}'", status)))?,
        extraction_mode: ExtractionMode::parse(&mode)
            .ok_or_else(|| invalid(3, format!("unknown extraction mode '{}'", mode)))?,
        raw_text: row.get(4)?,
        normalized_text: row.get(5)?,
        candidates: json_column(row, 6)?,
        confidence_map: json_column(row, 7)?,
        errors: json_column(row, 8)?,
        source_file_metadata: optional_json_column(row, 9)?,
        extraction: optional_json_column(row, 10)?,
        attempt: row.get(11)?,
        confidence: row.get(12)?,
        created_at: timestamp_column(row, 13)?,
        updated_at: timestamp_column(row, 14)?,
    })
}

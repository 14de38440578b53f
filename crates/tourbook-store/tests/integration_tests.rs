//! Integration tests for tourbook-store
//!
//! These tests verify that saved jobs load back unchanged and that listing
//! is scoped and ordered.

use chrono::{Duration, Utc};
use tempfile::TempDir;
use tourbook_domain::{
    Candidate, ContactFields, CoreFields, DealFields, DocumentFormat, DuplicateMatch, ErrorKind,
    ExtractionMode, ExtractionSummary, FieldValue, ImportJob, ImportJobStore, JobId, JobStatus,
    SourceFileMetadata, Stage, VenueFields,
};
use tourbook_store::SqliteJobStore;

fn sample_candidate() -> Candidate {
    let core = CoreFields {
        artist: FieldValue::present("The Midnight Owls".to_string(), 0.9),
        date: FieldValue::present("2025-03-03".to_string(), 0.85),
        ..Default::default()
    };
    let venue = VenueFields {
        name: FieldValue::present("The Fillmore".to_string(), 0.8),
        city: FieldValue::present("San Francisco".to_string(), 0.8),
        ..Default::default()
    };
    let deal = DealFields {
        fee: FieldValue::present("5000".to_string(), 0.7),
        currency: FieldValue::present("USD".to_string(), 0.7),
        ..Default::default()
    };
    let contact = ContactFields {
        email: FieldValue::present("agent@example.com".to_string(), 0.6),
        ..Default::default()
    };
    let mut candidate = Candidate::from_parts(core, venue, deal, vec![contact]);
    candidate.duplicates.push(DuplicateMatch {
        existing_record_id: "show-41".to_string(),
        score: 0.75,
        matched_fields: vec!["date".to_string(), "venue".to_string()],
    });
    candidate
}

fn reviewed_job(org_id: &str) -> ImportJob {
    let metadata = SourceFileMetadata {
        file_name: "offer.pdf".to_string(),
        mime_type: Some("application/pdf".to_string()),
        size_bytes: 2048,
    };
    let mut job = ImportJob::new(org_id, ExtractionMode::Llm, Some(metadata));
    job.begin_attempt();
    job.transition_to(JobStatus::Extracting).unwrap();
    job.raw_text = "Offer:\r\n The Midnight Owls  ".to_string();
    job.normalized_text = "Offer:\nThe Midnight Owls".to_string();
    job.extraction = Some(ExtractionSummary {
        format: Some(DocumentFormat::Pdf),
        page_count: Some(1),
        word_count: Some(4),
        is_low_text: true,
    });
    job.transition_to(JobStatus::Structuring).unwrap();
    job.record_error(
        Stage::Structuring,
        ErrorKind::Timeout,
        "deal: backend timed out",
        false,
    );
    job.record_error(
        Stage::Structuring,
        ErrorKind::MalformedModelOutput,
        "contacts: not JSON",
        false,
    );
    job.transition_to(JobStatus::Scoring).unwrap();
    job.set_candidates(vec![sample_candidate()]);
    job.transition_to(JobStatus::NeedsReview).unwrap();
    job
}

#[test]
fn test_store_initialization() {
    let store = SqliteJobStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_save_and_load_round_trip() {
    let mut store = SqliteJobStore::new(":memory:").unwrap();
    let job = reviewed_job("org-1");

    store.save(&job).unwrap();
    let loaded = store.load(job.id).unwrap().expect("job should exist");

    assert_eq!(loaded, job);
    assert_eq!(loaded.status, JobStatus::NeedsReview);
    assert_eq!(loaded.candidates[0].duplicates[0].existing_record_id, "show-41");
    assert_eq!(
        loaded.confidence_map.get("candidates[0].core.artist"),
        Some(&0.9)
    );
}

#[test]
fn test_unrounded_scores_load_bit_exact() {
    let mut store = SqliteJobStore::new(":memory:").unwrap();
    let mut candidate = sample_candidate();
    candidate.core.date = FieldValue::present("2025-03-03".to_string(), 1.0 / 3.0);
    candidate.duplicates[0].score = 0.1 + 0.2;
    let mut job = ImportJob::new("org-1", ExtractionMode::Llm, None);
    job.set_candidates(vec![candidate]);

    store.save(&job).unwrap();
    let loaded = store.load(job.id).unwrap().expect("job should exist");

    assert_eq!(loaded, job);
    assert_eq!(
        loaded.candidates[0].duplicates[0].score.to_bits(),
        (0.1_f64 + 0.2).to_bits()
    );
    assert_eq!(
        loaded.confidence_map.get("candidates[0].core.date"),
        Some(&(1.0 / 3.0))
    );
}

#[test]
fn test_error_trail_keeps_order() {
    let mut store = SqliteJobStore::new(":memory:").unwrap();
    let job = reviewed_job("org-1");
    store.save(&job).unwrap();

    let loaded = store.load(job.id).unwrap().unwrap();
    let kinds: Vec<ErrorKind> = loaded.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![ErrorKind::Timeout, ErrorKind::MalformedModelOutput]
    );
    assert_eq!(loaded.error_messages(), job.error_messages());
}

#[test]
fn test_load_missing_job() {
    let store = SqliteJobStore::new(":memory:").unwrap();
    assert!(store.load(JobId::new()).unwrap().is_none());
}

#[test]
fn test_save_replaces_existing_job() {
    let mut store = SqliteJobStore::new(":memory:").unwrap();
    let mut job = ImportJob::new("org-1", ExtractionMode::RuleBased, None);
    store.save(&job).unwrap();

    job.begin_attempt();
    job.transition_to(JobStatus::Extracting).unwrap();
    job.record_error(
        Stage::Extracting,
        ErrorKind::UnsupportedFormat,
        "Unsupported format: zip",
        true,
    );
    job.transition_to(JobStatus::Failed).unwrap();
    store.save(&job).unwrap();

    let loaded = store.load(job.id).unwrap().unwrap();
    assert_eq!(loaded, job);
    assert_eq!(loaded.status, JobStatus::Failed);
    assert!(loaded.source_file_metadata.is_none());
    assert_eq!(store.list_for_org("org-1").unwrap().len(), 1);
}

#[test]
fn test_list_for_org_newest_first() {
    let mut store = SqliteJobStore::new(":memory:").unwrap();
    let now = Utc::now();

    let mut oldest = ImportJob::new("org-1", ExtractionMode::Llm, None);
    oldest.created_at = now - Duration::minutes(10);
    let mut newest = ImportJob::new("org-1", ExtractionMode::Llm, None);
    newest.created_at = now;
    let mut middle = ImportJob::new("org-1", ExtractionMode::Llm, None);
    middle.created_at = now - Duration::minutes(5);
    let other = ImportJob::new("org-2", ExtractionMode::Llm, None);

    for job in [&oldest, &newest, &middle, &other] {
        store.save(job).unwrap();
    }

    let ids: Vec<JobId> = store
        .list_for_org("org-1")
        .unwrap()
        .iter()
        .map(|job| job.id)
        .collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

    assert_eq!(store.list_for_org("org-2").unwrap().len(), 1);
    assert!(store.list_for_org("org-3").unwrap().is_empty());
}

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("jobs.db");
    let job = reviewed_job("org-1");

    {
        let mut store = SqliteJobStore::new(&db_path).unwrap();
        store.save(&job).unwrap();
    }

    let store = SqliteJobStore::new(&db_path).unwrap();
    let loaded = store.load(job.id).unwrap().expect("job should survive reopen");
    assert_eq!(loaded, job);
}

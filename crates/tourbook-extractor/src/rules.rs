//! Deterministic regex extraction, used when no backend is configured
//!
//! Finds the first show date, a fee, a venue ("Venue:" line or "at The
//! Something") and e-mail addresses. Everything found shares one flat
//! confidence, and only when a date was found.

use crate::parser::{canonical_amount, currency_from_symbol};
use crate::types::CandidateExtraction;
use regex::Regex;
use std::sync::LazyLock;
use tourbook_domain::{
    normalize_date, Candidate, ContactFields, CoreFields, DealFields, ExtractionMode, FieldValue,
    VenueFields,
};
use tracing::debug;

/// Confidence broadcast to every field when a date was found
pub const RULE_CONFIDENCE: f64 = 0.4;

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec";

static RE_DATE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid regex"));

static RE_DATE_US: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").expect("valid regex"));

static RE_DATE_WRITTEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:{m})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{m})\.?,?\s+\d{{4}})\b",
        m = MONTHS
    ))
    .expect("valid regex")
});

static RE_FEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fee|guarantee)\b[^\n\d$€£]{0,20}([$€£]?\s?\d[\d.,]*(?:\s?[%€£$])?)")
        .expect("valid regex")
});

static RE_MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$€£]\s?\d[\d.,]*|\d[\d.,]*\s?[€£]").expect("valid regex"));

static RE_VENUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*venue\s*:\s*(.+?)\s*$").expect("valid regex"));

static RE_VENUE_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bat\s+((?:The\s+)?[A-Z][\w'&.-]*(?:\s+[A-Z][\w'&.-]*)*)").expect("valid regex")
});

static RE_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*subject\s*:\s*(.+?)\s*$").expect("valid regex"));

static RE_REPLY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(?:re|fwd?|aw)\s*:\s*)+").expect("valid regex"));

static RE_ARTIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*artist\s*:\s*(.+?)\s*$").expect("valid regex"));

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

/// Regex-based candidate extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    /// Create a new rule-based extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract a single candidate from `text`
    pub fn extract(&self, text: &str) -> CandidateExtraction {
        let date = first_date(text);
        let c = if date.is_some() { RULE_CONFIDENCE } else { 0.0 };

        let raw_fee = first_fee(text);
        let fee = raw_fee.as_deref().and_then(canonical_amount);
        let currency = raw_fee.as_deref().and_then(currency_from_symbol);

        let core = CoreFields {
            artist: FieldValue::text(capture(&RE_ARTIST, text), c),
            title: FieldValue::text(subject(text), c),
            date: FieldValue::new(date, c),
            ..Default::default()
        };
        let venue = VenueFields {
            name: FieldValue::text(venue_name(text), c),
            ..Default::default()
        };
        let deal = DealFields {
            fee: FieldValue::new(fee, c),
            currency: FieldValue::new(currency, c),
            ..Default::default()
        };

        let mut emails: Vec<String> = Vec::new();
        for m in RE_EMAIL.find_iter(text) {
            let email = m.as_str().to_lowercase();
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
        let contacts = emails
            .into_iter()
            .map(|email| ContactFields {
                email: FieldValue::present(email, c),
                ..Default::default()
            })
            .collect();

        let candidate = Candidate::from_parts(core, venue, deal, contacts);
        debug!(
            "Rule-based extraction: date {:?}, confidence {}",
            candidate.core.date.value, candidate.confidence
        );

        CandidateExtraction {
            candidates: vec![candidate],
            issues: Vec::new(),
            mode: ExtractionMode::RuleBased,
        }
    }
}

/// Earliest date in the text that normalizes
fn first_date(text: &str) -> Option<String> {
    let mut found: Vec<(usize, &str)> = [&*RE_DATE_ISO, &*RE_DATE_US, &*RE_DATE_WRITTEN]
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.as_str())))
        .collect();
    found.sort_by_key(|(start, _)| *start);
    found.into_iter().find_map(|(_, raw)| normalize_date(raw))
}

/// First labelled fee that is a plain amount, else the first symbol amount
///
/// A percentage after "fee" is a door deal, not a fee.
fn first_fee(text: &str) -> Option<String> {
    RE_FEE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .chain(RE_MONEY.find_iter(text))
        .map(|m| m.as_str())
        .find(|raw| canonical_amount(raw).is_some())
        .map(str::to_string)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn subject(text: &str) -> Option<String> {
    capture(&RE_SUBJECT, text).map(|s| RE_REPLY_PREFIX.replace(&s, "").trim().to_string())
}

fn venue_name(text: &str) -> Option<String> {
    capture(&RE_VENUE_LINE, text).or_else(|| capture(&RE_VENUE_AT, text))
}

//! Duplicate scoring logic

use crate::ScorerConfig;
use strsim::jaro_winkler;
use tourbook_domain::{normalize_date, Candidate, DuplicateMatch, ExistingRecord};
use tracing::debug;

/// Shortest normalized string allowed to match as a substring of another
const MIN_SUBSTRING_LEN: usize = 4;

/// Score of one existing record against a candidate, before thresholding
#[derive(Debug, Clone, PartialEq)]
pub struct RecordScore {
    /// Composite score (0.0-1.0)
    pub score: f64,
    /// Fields that contributed: "date", "title", "venue", "city"
    pub matched_fields: Vec<String>,
}

/// Flags existing records that look like the same booking as a candidate
///
/// Pure and deterministic: no I/O, and equal inputs always give equal
/// output in equal order.
#[derive(Debug, Clone, Default)]
pub struct DuplicateScorer {
    config: ScorerConfig,
}

impl DuplicateScorer {
    /// Create a new scorer with the given configuration
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Records scoring at or above the acceptance threshold, best first
    ///
    /// Equal scores keep the order of `existing`.
    pub fn score(&self, candidate: &Candidate, existing: &[ExistingRecord]) -> Vec<DuplicateMatch> {
        let mut matches: Vec<DuplicateMatch> = existing
            .iter()
            .filter_map(|record| {
                let scored = self.score_record(candidate, record);
                (scored.score >= self.config.acceptance_threshold).then(|| DuplicateMatch {
                    existing_record_id: record.id.clone(),
                    score: scored.score,
                    matched_fields: scored.matched_fields,
                })
            })
            .collect();

        // Stable: equal scores stay in input order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            "Scored candidate {} against {} records: {} possible duplicates",
            candidate.candidate_id,
            existing.len(),
            matches.len()
        );
        matches
    }

    /// Attach duplicates to every candidate, returning the total found
    pub fn annotate(&self, candidates: &mut [Candidate], existing: &[ExistingRecord]) -> usize {
        candidates
            .iter_mut()
            .map(|candidate| {
                let matches = self.score(candidate, existing);
                let found = matches.len();
                candidate.set_duplicates(matches);
                found
            })
            .sum()
    }

    /// Composite score of a single record
    ///
    /// Fields missing on either side are neutral: they add nothing and
    /// subtract nothing. Only two known, different dates are penalized.
    pub fn score_record(&self, candidate: &Candidate, record: &ExistingRecord) -> RecordScore {
        let mut score = 0.0;
        let mut matched_fields = Vec::new();

        // 1. Date
        let candidate_date = candidate.core.date.as_str();
        let record_date = record.date.as_deref().and_then(normalize_date);
        if let (Some(a), Some(b)) = (candidate_date, record_date.as_deref()) {
            if a == b {
                score += self.config.date_weight;
                matched_fields.push("date".to_string());
            } else {
                score -= self.config.date_mismatch_penalty;
            }
        }

        // 2. Title (artist when the candidate has no title)
        let title = candidate.display_title().as_str();
        if let Some(similarity) = self.name_similarity(title, Some(&record.title)) {
            score += self.config.title_weight * similarity;
            matched_fields.push("title".to_string());
        }

        // 3. Venue
        let venue = candidate.venue.name.as_str();
        if let Some(similarity) = self.name_similarity(venue, record.venue_name.as_deref()) {
            score += self.config.venue_weight * similarity;
            matched_fields.push("venue".to_string());
        }

        // 4. City, exact only
        let city = candidate.venue.city.as_str().map(normalize_name);
        let record_city = record.city.as_deref().map(normalize_name);
        if let (Some(a), Some(b)) = (city, record_city) {
            if !a.is_empty() && a == b {
                score += self.config.city_weight;
                matched_fields.push("city".to_string());
            }
        }

        RecordScore {
            score: score.clamp(0.0, 1.0),
            matched_fields,
        }
    }

    /// Fraction of a field's weight earned, `None` when nothing matched
    fn name_similarity(&self, a: Option<&str>, b: Option<&str>) -> Option<f64> {
        let a = normalize_name(a?);
        let b = normalize_name(b?);
        if a.is_empty() || b.is_empty() {
            return None;
        }

        if a == b {
            return Some(1.0);
        }

        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        if short.len() >= MIN_SUBSTRING_LEN && long.contains(short.as_str()) {
            return Some(1.0);
        }

        if self.config.fuzzy_titles {
            let similarity = jaro_winkler(&a, &b);
            if similarity >= self.config.fuzzy_title_floor {
                return Some(similarity);
            }
        }
        None
    }
}

/// Lowercase, punctuation to spaces, whitespace collapsed, leading "the" dropped
///
/// Apostrophes are removed outright so "Stubb's" and "Stubbs" agree.
pub fn normalize_name(name: &str) -> String {
    let lowered: String = name
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .flat_map(|c| {
            let keep = c.is_alphanumeric();
            c.to_lowercase().map(move |l| if keep { l } else { ' ' })
        })
        .collect();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    match words.as_slice() {
        ["the", rest @ ..] if !rest.is_empty() => rest.join(" "),
        _ => words.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourbook_domain::{CoreFields, FieldValue, VenueFields};

    fn candidate(title: Option<&str>, date: Option<&str>, venue: Option<&str>, city: Option<&str>) -> Candidate {
        let text = |v: Option<&str>| FieldValue::new(v.map(str::to_string), 0.8);
        Candidate::from_parts(
            CoreFields {
                title: text(title),
                date: text(date),
                ..Default::default()
            },
            VenueFields {
                name: text(venue),
                city: text(city),
                ..Default::default()
            },
            Default::default(),
            vec![],
        )
    }

    fn record(id: &str, title: &str, date: Option<&str>, venue: Option<&str>, city: Option<&str>) -> ExistingRecord {
        ExistingRecord {
            id: id.to_string(),
            title: title.to_string(),
            date: date.map(str::to_string),
            venue_name: venue.map(str::to_string),
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  The Fillmore! "), "fillmore");
        assert_eq!(normalize_name("Summer   TOUR"), "summer tour");
        assert_eq!(normalize_name("The"), "the");
        assert_eq!(normalize_name("--"), "");
        assert_eq!(normalize_name("ÖRNSKÖLDSVIK"), "örnsköldsvik");
        assert_eq!(normalize_name("Café  ÉLAN"), "café élan");
    }

    #[test]
    fn test_title_and_date_match() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("Summer Tour"), Some("2025-06-01"), None, None);
        let r = record("r1", "summer tour", Some("2025-06-01"), None, Some("Austin"));

        let scored = scorer.score_record(&c, &r);
        assert_eq!(scored.matched_fields, vec!["date", "title"]);
        assert!((scored.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_record_date_is_normalized() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("Summer Tour"), Some("2025-06-01"), None, None);
        let r = record("r1", "Summer Tour", Some("June 1, 2025"), None, None);
        assert!(scorer.score_record(&c, &r).matched_fields.contains(&"date".to_string()));
    }

    #[test]
    fn test_different_dates_are_penalized() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("Summer Tour"), Some("2025-06-02"), Some("Stubb's"), Some("Austin"));
        let r = record("r1", "Summer Tour", Some("2025-06-01"), Some("Stubbs"), Some("Austin"));
        let scored = scorer.score_record(&c, &r);
        // title 0.30 + venue 0.15 + city 0.10 - penalty 0.25
        assert!((scored.score - 0.30).abs() < 1e-9);
        assert!(!scored.matched_fields.contains(&"date".to_string()));
        assert!(scorer.score(&c, &[r]).is_empty());
    }

    #[test]
    fn test_missing_fields_are_neutral() {
        let scorer = DuplicateScorer::default();
        let c = candidate(None, None, None, None);
        let r = record("r1", "Summer Tour", Some("2025-06-01"), Some("Stubbs"), Some("Austin"));
        let scored = scorer.score_record(&c, &r);
        assert_eq!(scored.score, 0.0);
        assert!(scored.matched_fields.is_empty());
    }

    #[test]
    fn test_substring_and_fuzzy_titles() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("The Band - Summer Tour 2025"), None, None, None);
        let r = record("r1", "Summer Tour", None, None, None);
        assert_eq!(scorer.score_record(&c, &r).matched_fields, vec!["title"]);

        let c = candidate(Some("Summer Tuor"), None, None, None);
        let r = record("r1", "Summer Tour", None, None, None);
        let fuzzy = scorer.score_record(&c, &r);
        assert_eq!(fuzzy.matched_fields, vec!["title"]);
        assert!(fuzzy.score < 0.30);

        let strict = DuplicateScorer::new(ScorerConfig::strict());
        assert!(strict.score_record(&c, &r).matched_fields.is_empty());
    }

    #[test]
    fn test_short_titles_do_not_substring_match() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("Go"), None, None, None);
        let r = record("r1", "Go West", None, None, None);
        assert!(scorer.score_record(&c, &r).matched_fields.is_empty());
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let scorer = DuplicateScorer::default();
        let c = candidate(Some("Summer Tour"), Some("2025-06-01"), None, Some("Austin"));
        let existing = vec![
            record("a", "Summer Tour", Some("2025-06-01"), None, None),
            record("b", "Summer Tour", Some("2025-06-01"), None, Some("Austin")),
            record("c", "Summer Tour", Some("2025-06-01"), None, None),
            record("d", "Winter Tour", Some("2025-12-01"), None, None),
        ];
        let ids: Vec<_> = scorer
            .score(&c, &existing)
            .into_iter()
            .map(|m| m.existing_record_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_annotate_counts_matches() {
        let scorer = DuplicateScorer::default();
        let mut candidates = vec![
            candidate(Some("Summer Tour"), Some("2025-06-01"), None, None),
            candidate(None, None, None, None),
        ];
        let existing = vec![record("a", "Summer Tour", Some("2025-06-01"), None, None)];
        assert_eq!(scorer.annotate(&mut candidates, &existing), 1);
        assert_eq!(candidates[0].duplicates.len(), 1);
        assert!(candidates[1].duplicates.is_empty());
    }
}

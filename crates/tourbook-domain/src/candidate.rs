//! Candidate module - one proposed show booking derived from a document

use crate::confidence::min_confidence;
use crate::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a candidate, based on UUIDv7
///
/// UUIDv7 keeps candidates of one job roughly ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(uuid::Uuid);

impl CandidateId {
    /// Generate a new UUIDv7-based CandidateId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a CandidateId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid candidate id: {}", e))
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Core show information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoreFields {
    /// Performing artist or act
    pub artist: FieldValue<String>,
    /// Show or tour title
    pub title: FieldValue<String>,
    /// Show date, always canonical `YYYY-MM-DD` when present
    pub date: FieldValue<String>,
    /// Set or show start time as written
    pub start_time: FieldValue<String>,
    /// Doors time as written
    pub door_time: FieldValue<String>,
    /// Booking status ("confirmed", "hold", "offer", ...)
    pub status: FieldValue<String>,
}

/// Venue information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VenueFields {
    /// Venue name
    pub name: FieldValue<String>,
    /// Street address
    pub address: FieldValue<String>,
    /// City
    pub city: FieldValue<String>,
    /// State, province or region
    pub region: FieldValue<String>,
    /// Country
    pub country: FieldValue<String>,
    /// Capacity as written
    pub capacity: FieldValue<String>,
}

/// Deal terms
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DealFields {
    /// Guarantee/fee as a plain decimal string ("5000")
    pub fee: FieldValue<String>,
    /// ISO currency code or symbol as written
    pub currency: FieldValue<String>,
    /// Deal type ("guarantee", "versus", "door split", ...)
    pub deal_type: FieldValue<String>,
    /// Ticket price as written
    pub ticket_price: FieldValue<String>,
}

/// One contact mentioned in the document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactFields {
    /// Contact name
    pub name: FieldValue<String>,
    /// E-mail address
    pub email: FieldValue<String>,
    /// Phone number
    pub phone: FieldValue<String>,
    /// Role ("promoter", "production", ...)
    pub role: FieldValue<String>,
}

/// A suspected duplicate of an existing record
///
/// Purely informational: the existing record is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// ID of the existing record
    pub existing_record_id: String,
    /// Similarity score in `[0.0, 1.0]`
    pub score: f64,
    /// Names of the fields that matched ("title", "date", "venue", "city")
    pub matched_fields: Vec<String>,
}

/// Snapshot of an existing show record, supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Record identifier in the caller's store
    pub id: String,
    /// Show title
    pub title: String,
    /// Show date as stored by the caller
    pub date: Option<String>,
    /// Venue name
    #[serde(default)]
    pub venue_name: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
}

/// One proposed show-booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier
    pub candidate_id: CandidateId,
    /// Core show information
    pub core: CoreFields,
    /// Venue information
    pub venue: VenueFields,
    /// Deal terms
    pub deal: DealFields,
    /// Contacts mentioned in the document
    #[serde(default)]
    pub contacts: Vec<ContactFields>,
    /// Aggregate confidence, never higher than any required field's confidence
    pub confidence: f64,
    /// Possible duplicates, sorted descending by score
    #[serde(default)]
    pub duplicates: Vec<DuplicateMatch>,
}

impl Candidate {
    /// An empty, zero-confidence candidate
    pub fn empty() -> Self {
        Self {
            candidate_id: CandidateId::new(),
            core: CoreFields::default(),
            venue: VenueFields::default(),
            deal: DealFields::default(),
            contacts: Vec::new(),
            confidence: 0.0,
            duplicates: Vec::new(),
        }
    }

    /// Build a candidate from field groups and compute its aggregate confidence
    pub fn from_parts(
        core: CoreFields,
        venue: VenueFields,
        deal: DealFields,
        contacts: Vec<ContactFields>,
    ) -> Self {
        let mut candidate = Self {
            core,
            venue,
            deal,
            contacts,
            ..Self::empty()
        };
        candidate.recompute_confidence();
        candidate
    }

    /// Title used for display and duplicate matching: title, else artist
    pub fn display_title(&self) -> &FieldValue<String> {
        if self.core.title.is_present() {
            &self.core.title
        } else {
            &self.core.artist
        }
    }

    /// Recompute the aggregate as the minimum over the required fields
    /// (date and display title). A missing required field yields `0.0`.
    pub fn recompute_confidence(&mut self) {
        self.confidence = min_confidence([
            self.core.date.confidence,
            self.display_title().confidence,
        ]);
    }

    /// Whether nothing at all was extracted
    pub fn is_empty(&self) -> bool {
        let core = &self.core;
        let venue = &self.venue;
        let deal = &self.deal;
        let any_present = [
            &core.artist,
            &core.title,
            &core.date,
            &core.start_time,
            &core.door_time,
            &core.status,
            &venue.name,
            &venue.address,
            &venue.city,
            &venue.region,
            &venue.country,
            &venue.capacity,
            &deal.fee,
            &deal.currency,
            &deal.deal_type,
            &deal.ticket_price,
        ]
        .iter()
        .any(|f| f.is_present());
        !any_present && self.contacts.is_empty()
    }

    /// Attach duplicate matches, keeping them sorted descending by score
    ///
    /// The sort is stable, so equal scores keep the order they were given in.
    pub fn set_duplicates(&mut self, mut duplicates: Vec<DuplicateMatch>) {
        duplicates.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.duplicates = duplicates;
    }

    /// Flattened `(field path, confidence)` pairs, relative to this candidate
    ///
    /// Paths look like `core.artist`, `venue.city`, `contacts[0].email`.
    pub fn field_confidences(&self) -> Vec<(String, f64)> {
        let mut out = vec![
            ("core.artist".to_string(), self.core.artist.confidence),
            ("core.title".to_string(), self.core.title.confidence),
            ("core.date".to_string(), self.core.date.confidence),
            ("core.start_time".to_string(), self.core.start_time.confidence),
            ("core.door_time".to_string(), self.core.door_time.confidence),
            ("core.status".to_string(), self.core.status.confidence),
            ("venue.name".to_string(), self.venue.name.confidence),
            ("venue.address".to_string(), self.venue.address.confidence),
            ("venue.city".to_string(), self.venue.city.confidence),
            ("venue.region".to_string(), self.venue.region.confidence),
            ("venue.country".to_string(), self.venue.country.confidence),
            ("venue.capacity".to_string(), self.venue.capacity.confidence),
            ("deal.fee".to_string(), self.deal.fee.confidence),
            ("deal.currency".to_string(), self.deal.currency.confidence),
            ("deal.deal_type".to_string(), self.deal.deal_type.confidence),
            ("deal.ticket_price".to_string(), self.deal.ticket_price.confidence),
        ];
        for (i, contact) in self.contacts.iter().enumerate() {
            out.push((format!("contacts[{}].name", i), contact.name.confidence));
            out.push((format!("contacts[{}].email", i), contact.email.confidence));
            out.push((format!("contacts[{}].phone", i), contact.phone.confidence));
            out.push((format!("contacts[{}].role", i), contact.role.confidence));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dup(id: &str, score: f64) -> DuplicateMatch {
        DuplicateMatch {
            existing_record_id: id.to_string(),
            score,
            matched_fields: vec![],
        }
    }

    #[test]
    fn test_empty_candidate_has_zero_confidence() {
        let candidate = Candidate::empty();
        assert_eq!(candidate.confidence, 0.0);
        assert!(candidate.is_empty());
    }

    #[test]
    fn test_confidence_is_min_of_required_fields() {
        let core = CoreFields {
            title: FieldValue::present("Summer Tour".to_string(), 0.9),
            date: FieldValue::present("2025-06-01".to_string(), 0.6),
            ..Default::default()
        };
        let candidate = Candidate::from_parts(core, Default::default(), Default::default(), vec![]);
        assert_eq!(candidate.confidence, 0.6);
    }

    #[test]
    fn test_missing_date_means_zero_confidence() {
        let core = CoreFields {
            title: FieldValue::present("Summer Tour".to_string(), 0.9),
            ..Default::default()
        };
        let candidate = Candidate::from_parts(core, Default::default(), Default::default(), vec![]);
        assert_eq!(candidate.confidence, 0.0);
    }

    #[test]
    fn test_artist_stands_in_for_title() {
        let core = CoreFields {
            artist: FieldValue::present("The Band".to_string(), 0.8),
            date: FieldValue::present("2025-06-01".to_string(), 0.8),
            ..Default::default()
        };
        let candidate = Candidate::from_parts(core, Default::default(), Default::default(), vec![]);
        assert_eq!(candidate.display_title().as_str(), Some("The Band"));
        assert_eq!(candidate.confidence, 0.8);
    }

    #[test]
    fn test_duplicates_sorted_stably() {
        let mut candidate = Candidate::empty();
        candidate.set_duplicates(vec![dup("a", 0.6), dup("b", 0.9), dup("c", 0.6)]);
        let ids: Vec<_> = candidate
            .duplicates
            .iter()
            .map(|d| d.existing_record_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_field_confidences_include_contacts() {
        let mut candidate = Candidate::empty();
        candidate.contacts.push(ContactFields {
            email: FieldValue::present("booker@example.com".to_string(), 0.7),
            ..Default::default()
        });
        let paths = candidate.field_confidences();
        assert!(paths
            .iter()
            .any(|(p, c)| p == "contacts[0].email" && *c == 0.7));
        assert!(!candidate.is_empty());
    }

    #[test]
    fn test_candidate_id_round_trip() {
        let id = CandidateId::new();
        let parsed = CandidateId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}

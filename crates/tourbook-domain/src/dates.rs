//! Canonical date handling
//!
//! Every date that leaves the extraction layer is either `None` or a canonical
//! `YYYY-MM-DD` string. Duplicate scoring and persistence rely on this.

use chrono::{Datelike, NaiveDate};

/// Formats tried, in order, after the input has been cleaned up.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%B %d %Y",
    "%d %B %Y",
    "%B %d %y",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

/// Earliest and latest years accepted as plausible booking dates
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

/// Normalize a free-form date string to `YYYY-MM-DD`.
///
/// Returns `None` when the input cannot be parsed unambiguously into a
/// calendar date. Times and timezones after an ISO date are ignored.
///
/// # Examples
///
/// ```
/// use tourbook_domain::normalize_date;
///
/// assert_eq!(normalize_date("2025-03-03").as_deref(), Some("2025-03-03"));
/// assert_eq!(normalize_date("March 3 2025").as_deref(), Some("2025-03-03"));
/// assert_eq!(normalize_date("Mon, Mar 3rd, 2025").as_deref(), Some("2025-03-03"));
/// assert_eq!(normalize_date("3/3/2025").as_deref(), Some("2025-03-03"));
/// assert_eq!(normalize_date("sometime in spring"), None);
/// ```
pub fn normalize_date(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }

    // ISO dates with a trailing time component ("2025-06-01T20:00:00Z")
    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return plausible(date);
        }
    }

    let cleaned = clean(trimmed);
    FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(&cleaned, fmt)
                .ok()
                .and_then(plausible)
        })
}

fn plausible(date: NaiveDate) -> Option<String> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Some(date.format("%Y-%m-%d").to_string())
    } else {
        None
    }
}

/// Lowercase, drop commas, weekday names and ordinal suffixes.
fn clean(input: &str) -> String {
    let lowered = input.to_lowercase().replace(',', " ");
    let mut tokens: Vec<String> = lowered
        .split_whitespace()
        .map(|t| strip_ordinal(t.trim_end_matches('.')))
        .map(|t| if t == "sept" { "sep".to_string() } else { t })
        .collect();

    if tokens.len() > 1 && WEEKDAYS.contains(&tokens[0].as_str()) {
        tokens.remove(0);
    }

    tokens.join(" ")
}

fn strip_ordinal(token: &str) -> String {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = token.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number.to_string();
            }
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_variants() {
        assert_eq!(normalize_date("2025-06-01").as_deref(), Some("2025-06-01"));
        assert_eq!(
            normalize_date("2025-06-01T20:00:00Z").as_deref(),
            Some("2025-06-01")
        );
        assert_eq!(normalize_date("2025/06/01").as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_us_numeric() {
        assert_eq!(normalize_date("06/01/2025").as_deref(), Some("2025-06-01"));
        assert_eq!(normalize_date("6/1/25").as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_written_months() {
        assert_eq!(normalize_date("March 3, 2025").as_deref(), Some("2025-03-03"));
        assert_eq!(normalize_date("3 March 2025").as_deref(), Some("2025-03-03"));
        assert_eq!(normalize_date("Sept. 14th 2025").as_deref(), Some("2025-09-14"));
        assert_eq!(
            normalize_date("Saturday, June 1st, 2025").as_deref(),
            Some("2025-06-01")
        );
    }

    #[test]
    fn test_rejects_garbage_and_impossible_dates() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("TBD"), None);
        assert_eq!(normalize_date("2025-02-30"), None);
        assert_eq!(normalize_date("March 2025"), None);
        assert_eq!(normalize_date("0001-01-01"), None);
    }
}

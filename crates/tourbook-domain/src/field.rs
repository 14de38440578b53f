//! Confidence-bearing field wrapper

use crate::confidence::clamp_confidence;
use serde::{Deserialize, Serialize};

/// A single extracted value together with how sure the extractor was about it.
///
/// A missing value always carries confidence `0.0`; callers can therefore tell
/// "extracted with high confidence" from "guessed" from "absent" without
/// inspecting anything else.
///
/// # Examples
///
/// ```
/// use tourbook_domain::FieldValue;
///
/// let fee = FieldValue::new(Some("5000".to_string()), 0.8);
/// assert!(fee.is_present());
///
/// let artist: FieldValue<String> = FieldValue::empty();
/// assert_eq!(artist.confidence, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue<T> {
    /// Extracted value, `None` when the source did not yield one
    pub value: Option<T>,
    /// Confidence in `[0.0, 1.0]`
    pub confidence: f64,
}

impl<T> FieldValue<T> {
    /// Create a field, clamping the confidence and zeroing it for absent values
    pub fn new(value: Option<T>, confidence: f64) -> Self {
        let confidence = if value.is_some() {
            clamp_confidence(confidence)
        } else {
            0.0
        };
        Self { value, confidence }
    }

    /// A field with a present value
    pub fn present(value: T, confidence: f64) -> Self {
        Self::new(Some(value), confidence)
    }

    /// An absent field (value `None`, confidence `0.0`)
    pub fn empty() -> Self {
        Self {
            value: None,
            confidence: 0.0,
        }
    }

    /// Whether a value was extracted
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the value, if any
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Keep `self` if it has a value, otherwise fall back to `other`
    pub fn or(self, other: FieldValue<T>) -> FieldValue<T> {
        if self.is_present() {
            self
        } else {
            other
        }
    }
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl FieldValue<String> {
    /// Build a text field, treating blank strings as absent
    pub fn text(value: Option<String>, confidence: f64) -> Self {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self::new(value, confidence)
    }

    /// Borrow the value as `&str`
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_has_zero_confidence() {
        let field: FieldValue<String> = FieldValue::new(None, 0.9);
        assert_eq!(field.confidence, 0.0);
        assert!(!field.is_present());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let field = FieldValue::present("x".to_string(), 1.5);
        assert_eq!(field.confidence, 0.0);

        let field = FieldValue::present("x".to_string(), 0.75);
        assert_eq!(field.confidence, 0.75);
    }

    #[test]
    fn test_blank_text_is_absent() {
        let field = FieldValue::text(Some("   ".to_string()), 0.9);
        assert!(!field.is_present());
        assert_eq!(field.confidence, 0.0);

        let field = FieldValue::text(Some("  The Fillmore ".to_string()), 0.9);
        assert_eq!(field.as_str(), Some("The Fillmore"));
    }

    #[test]
    fn test_or_prefers_present_value() {
        let a: FieldValue<String> = FieldValue::empty();
        let b = FieldValue::present("Austin".to_string(), 0.6);
        assert_eq!(a.or(b.clone()), b);

        let c = FieldValue::present("Denver".to_string(), 0.4);
        assert_eq!(c.clone().or(b), c);
    }

    #[test]
    fn test_serializes_null_value() {
        let field: FieldValue<String> = FieldValue::empty();
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"value":null,"confidence":0.0}"#);
    }
}

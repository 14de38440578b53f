//! Confidence policy
//!
//! Confidence is always a plain `f64` in `[0.0, 1.0]`. Values reported by an
//! extraction backend are untrusted: anything outside the range, non-finite,
//! or non-numeric collapses to `0.0` rather than being saturated, so a
//! misbehaving model can never overstate certainty.

use serde_json::Value;

/// Clamp a reported confidence into `[0.0, 1.0]`.
///
/// Out-of-range and non-finite values are treated as `0.0`.
///
/// # Examples
///
/// ```
/// use tourbook_domain::clamp_confidence;
///
/// assert_eq!(clamp_confidence(0.7), 0.7);
/// assert_eq!(clamp_confidence(1.5), 0.0);
/// assert_eq!(clamp_confidence(-0.2), 0.0);
/// assert_eq!(clamp_confidence(f64::NAN), 0.0);
/// ```
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        0.0
    }
}

/// Read a confidence out of an arbitrary JSON value.
///
/// Numbers and numeric strings (`"0.8"`) are accepted; everything else
/// (missing, `null`, `"high"`, objects) yields `0.0`.
pub fn confidence_from_json(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.map(clamp_confidence).unwrap_or(0.0)
}

/// Aggregate confidences pessimistically: the minimum, or `0.0` when empty.
///
/// Used wherever an aggregate must not claim more certainty than its weakest
/// input.
pub fn min_confidence<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .map(clamp_confidence)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_boundaries_are_kept() {
        assert_eq!(clamp_confidence(0.0), 0.0);
        assert_eq!(clamp_confidence(1.0), 1.0);
    }

    #[test]
    fn test_confidence_from_json() {
        assert_eq!(confidence_from_json(Some(&json!(0.85))), 0.85);
        assert_eq!(confidence_from_json(Some(&json!("0.5"))), 0.5);
        assert_eq!(confidence_from_json(Some(&json!(1.5))), 0.0);
        assert_eq!(confidence_from_json(Some(&json!(-0.2))), 0.0);
        assert_eq!(confidence_from_json(Some(&json!("very high"))), 0.0);
        assert_eq!(confidence_from_json(Some(&json!(null))), 0.0);
        assert_eq!(confidence_from_json(None), 0.0);
    }

    #[test]
    fn test_min_confidence() {
        assert_eq!(min_confidence(vec![0.9, 0.4, 0.7]), 0.4);
        assert_eq!(min_confidence(Vec::<f64>::new()), 0.0);
        assert_eq!(min_confidence(vec![0.9, 2.0]), 0.0);
    }

    proptest! {
        #[test]
        fn clamped_confidence_is_always_in_range(value in proptest::num::f64::ANY) {
            let c = clamp_confidence(value);
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn min_never_exceeds_any_input(values in proptest::collection::vec(0.0f64..=1.0, 1..10)) {
            let m = min_confidence(values.clone());
            for v in values {
                prop_assert!(m <= v);
            }
        }
    }
}

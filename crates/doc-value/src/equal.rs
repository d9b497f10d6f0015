//! Structural equality and scalar ordering over [`Document`] values.
//!
//! One canonical deep comparison backs everything that needs "same value"
//! semantics (set membership, `PartialEq`), and one partial ordering backs
//! everything that needs "smaller/larger" semantics (`$min`/`$max`, sort
//! keys, query comparisons).

use std::cmp::Ordering;

use crate::Document;

/// Performs a deep structural equality check between two document values.
///
/// - `Int` and `Float` compare numerically (`1 == 1.0`).
/// - Arrays compare element by element, in order.
/// - Objects compare as key sets, insertion order ignored.
/// - Values of different kinds are never equal.
///
/// # Example
///
/// ```
/// use doc_value::deep_equal;
/// use doc_value::Document;
/// use serde_json::json;
///
/// let a = Document::from(json!({"tags": ["a", "b"]}));
/// let b = Document::from(json!({"tags": ["a", "b"]}));
/// let c = Document::from(json!({"tags": ["b", "a"]}));
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Document, b: &Document) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.compare(y) == Some(Ordering::Equal);
    }

    match (a, b) {
        (Document::Null, Document::Null) => true,
        (Document::Bool(a), Document::Bool(b)) => a == b,
        (Document::String(a), Document::String(b)) => a == b,
        (Document::Date(a), Document::Date(b)) => a == b,

        (Document::Array(arr_a), Document::Array(arr_b)) => {
            if arr_a.len() != arr_b.len() {
                return false;
            }
            arr_a.iter().zip(arr_b.iter()).all(|(x, y)| deep_equal(x, y))
        }

        (Document::Object(obj_a), Document::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            obj_a.iter().all(|(key, val_a)| match obj_b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }

        // Different kinds are never equal.
        _ => false,
    }
}

/// Orders two scalar values of the same kind.
///
/// Numbers compare numerically, strings lexicographically, booleans with
/// `false < true`, dates chronologically. Containers, nulls and any
/// cross-kind pair have no defined order and return `None`; callers treat
/// that as "do not act".
pub fn compare(a: &Document, b: &Document) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.compare(y);
    }

    match (a, b) {
        (Document::String(a), Document::String(b)) => Some(a.cmp(b)),
        (Document::Bool(a), Document::Bool(b)) => Some(a.cmp(b)),
        (Document::Date(a), Document::Date(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        Document::from(v)
    }

    #[test]
    fn scalar_equality() {
        assert!(deep_equal(&doc(json!(1)), &doc(json!(1))));
        assert!(!deep_equal(&doc(json!(1)), &doc(json!(2))));
        assert!(deep_equal(&doc(json!("a")), &doc(json!("a"))));
        assert!(deep_equal(&doc(json!(null)), &doc(json!(null))));
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert!(deep_equal(&Document::Int(1), &Document::Float(1.0)));
        assert!(!deep_equal(&Document::Int(1), &Document::Float(1.5)));
    }

    #[test]
    fn different_kinds_never_equal() {
        assert!(!deep_equal(&doc(json!(0)), &doc(json!(null))));
        assert!(!deep_equal(&doc(json!(0)), &doc(json!(false))));
        assert!(!deep_equal(&doc(json!(1)), &doc(json!(true))));
        assert!(!deep_equal(&doc(json!("")), &doc(json!(null))));
        assert!(!deep_equal(&doc(json!({})), &doc(json!([]))));
    }

    #[test]
    fn arrays_are_ordered() {
        assert!(deep_equal(&doc(json!([1, 2])), &doc(json!([1, 2]))));
        assert!(!deep_equal(&doc(json!([1, 2])), &doc(json!([2, 1]))));
        assert!(!deep_equal(&doc(json!([1, 2])), &doc(json!([1, 2, 3]))));
    }

    #[test]
    fn objects_ignore_key_order() {
        assert!(deep_equal(
            &doc(json!({"a": 1, "b": 2})),
            &doc(json!({"b": 2, "a": 1}))
        ));
        assert!(!deep_equal(
            &doc(json!({"a": 1})),
            &doc(json!({"a": 1, "b": 2}))
        ));
    }

    #[test]
    fn nested_structures() {
        assert!(deep_equal(
            &doc(json!({"a": [{"b": "c"}]})),
            &doc(json!({"a": [{"b": "c"}]}))
        ));
        assert!(!deep_equal(
            &doc(json!({"a": [{"b": "c"}]})),
            &doc(json!({"a": [{"b": "d"}]}))
        ));
    }

    #[test]
    fn compare_numbers() {
        assert_eq!(
            compare(&doc(json!(1)), &doc(json!(2))),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(&Document::Float(2.5), &Document::Int(2)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn compare_strings_and_bools() {
        assert_eq!(
            compare(&doc(json!("a")), &doc(json!("b"))),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(&doc(json!(false)), &doc(json!(true))),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn compare_dates() {
        use chrono::TimeZone;
        let earlier = Document::Date(chrono::Utc.timestamp_opt(1_000, 0).unwrap());
        let later = Document::Date(chrono::Utc.timestamp_opt(2_000, 0).unwrap());
        assert_eq!(compare(&earlier, &later), Some(Ordering::Less));
    }

    #[test]
    fn cross_kind_comparison_is_undefined() {
        assert_eq!(compare(&doc(json!(1)), &doc(json!("1"))), None);
        assert_eq!(compare(&doc(json!(null)), &doc(json!(null))), None);
        assert_eq!(compare(&doc(json!([1])), &doc(json!([2]))), None);
    }
}

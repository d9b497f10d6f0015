//! Schema-less document values.
//!
//! [`Document`] is the nested value tree the update engine reads and
//! rewrites: maps, sequences and scalars (string, number, boolean, date,
//! null). Containers are [`Arc`]-wrapped, so cloning a `Document` is cheap
//! and a rebuilt tree shares every untouched subtree with its source.
//!
//! # Example
//!
//! ```
//! use doc_value::Document;
//! use serde_json::json;
//!
//! let doc = Document::from(json!({"name": "yakisoba", "servings": 2}));
//! assert_eq!(doc.get("name"), Some(&Document::String("yakisoba".into())));
//!
//! // Clones share the underlying map allocation.
//! let copy = doc.clone();
//! assert!(doc.ptr_eq(&copy));
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

pub mod equal;
pub mod json;

pub use equal::{compare, deep_equal};

/// A schema-less nested value.
///
/// Object fields keep their insertion order ([`IndexMap`]), which is
/// load-bearing for callers that fold over document keys in order.
#[derive(Debug, Clone, Default)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Arc<Vec<Document>>),
    Object(Arc<IndexMap<String, Document>>),
}

impl Document {
    /// Wraps a vector of values as a shared array.
    pub fn array(items: Vec<Document>) -> Document {
        Document::Array(Arc::new(items))
    }

    /// Wraps an ordered field map as a shared object.
    pub fn object(fields: IndexMap<String, Document>) -> Document {
        Document::Object(Arc::new(fields))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Document::Int(i) => Some(Number::Int(*i)),
            Document::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Document::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Document>> {
        match self {
            Document::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a field of an object value.
    ///
    /// Returns `None` for missing fields and for non-object values.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Returns `true` when both values are the *same* shared container
    /// allocation.
    ///
    /// Scalars are copied by value, so identity is only defined for arrays
    /// and objects. This is how tests observe structural sharing between an
    /// input tree and a rebuilt one.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        match (self, other) {
            (Document::Array(a), Document::Array(b)) => Arc::ptr_eq(a, b),
            (Document::Object(a), Document::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Structural equality; see [`deep_equal`].
impl PartialEq for Document {
    fn eq(&self, other: &Document) -> bool {
        deep_equal(self, other)
    }
}

/// A scalar number, preserving the integer/float distinction.
///
/// Arithmetic stays integral while both operands are `Int` and the result
/// fits in an `i64`; any `Float` operand, or an overflow, produces `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::Int(product),
                None => Number::Float(a as f64 * b as f64),
            },
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// Numeric ordering across the `Int`/`Float` divide.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Number {
        Number::Int(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Number {
        Number::Float(f)
    }
}

impl From<Number> for Document {
    fn from(n: Number) -> Document {
        match n {
            Number::Int(i) => Document::Int(i),
            Number::Float(f) => Document::Float(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_containers() {
        let doc = Document::array(vec![Document::Int(1), Document::Int(2)]);
        let copy = doc.clone();
        assert!(doc.ptr_eq(&copy));
    }

    #[test]
    fn scalars_have_no_identity() {
        let a = Document::Int(1);
        let b = Document::Int(1);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_allocations_are_not_identical() {
        let a = Document::array(vec![Document::Int(1)]);
        let b = Document::array(vec![Document::Int(1)]);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn get_reads_object_fields() {
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), Document::Int(1));
        let doc = Document::object(fields);
        assert_eq!(doc.get("a"), Some(&Document::Int(1)));
        assert_eq!(doc.get("b"), None);
        assert_eq!(Document::Int(1).get("a"), None);
    }

    #[test]
    fn int_add_overflow_promotes_to_float() {
        let sum = Number::Int(i64::MAX).add(Number::Int(1));
        assert!(matches!(sum, Number::Float(_)));
    }

    #[test]
    fn int_arithmetic_stays_integral() {
        assert_eq!(Number::Int(2).add(Number::Int(3)), Number::Int(5));
        assert_eq!(Number::Int(2).mul(Number::Int(3)), Number::Int(6));
    }

    #[test]
    fn mixed_arithmetic_is_float() {
        assert_eq!(Number::Int(2).add(Number::Float(0.5)), Number::Float(2.5));
    }

    #[test]
    fn number_compare_mixed_kinds() {
        use std::cmp::Ordering;
        assert_eq!(
            Number::Int(1).compare(Number::Float(1.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::Int(2).compare(Number::Float(2.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::Float(f64::NAN).compare(Number::Int(0)), None);
    }
}

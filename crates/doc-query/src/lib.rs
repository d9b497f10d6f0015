//! Condition matching over document values.
//!
//! The update engine's `$pull` operator removes the array elements that
//! match a condition; this crate supplies that predicate evaluator. The
//! condition language is the minimal find-operation subset: equality,
//! comparisons, set membership, existence, regex, negation, and sub-field
//! conditions, combined by implicit conjunction.
//!
//! Matching is pure — the same `(condition, element)` pair always produces
//! the same answer — so the engine's determinism contract extends through
//! this boundary.
//!
//! # Example
//!
//! ```
//! use doc_query::{filter_out, QueryCondition};
//! use doc_value::Document;
//! use serde_json::json;
//!
//! let condition = QueryCondition::from_document(&Document::from(json!({"$gte": 6}))).unwrap();
//! let elements: Vec<Document> =
//!     [json!(2), json!(6), json!(9)].map(Document::from).into();
//!
//! // Survivors: the elements that do NOT match.
//! assert_eq!(filter_out(&elements, &condition), vec![Document::Int(2)]);
//! ```

use thiserror::Error;

pub mod condition;
pub mod matches;

pub use condition::QueryCondition;
pub use matches::{filter_out, matches};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid query condition: {0}")]
    InvalidCondition(String),
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),
}

//! Immutable update-operator engine.
//!
//! Applies a declarative set of mongo-style modification operators
//! (`$set`, `$inc`, `$push`, …) to a nested [`Document`] tree, addressed
//! by dot-notation paths, and returns a *new* tree. The input is never
//! mutated: only the ancestor chain of each written path is rebuilt, and
//! every untouched subtree is reference-shared with the original.
//!
//! Operators apply in the order the operator document lists them, so a
//! later operator observes the writes of an earlier one. Errors abort the
//! whole call; since nothing is mutated in place there is never partial
//! application to roll back.
//!
//! # Example
//!
//! ```
//! use doc_update::{assign, decode_operation, Document};
//! use serde_json::json;
//!
//! let doc = Document::from(json!({"a": {"b": 1}}));
//! let operation = decode_operation(&json!({"$inc": {"a.b": 2}})).unwrap();
//!
//! let updated = assign(&doc, &operation).unwrap();
//! assert_eq!(updated, Document::from(json!({"a": {"b": 3}})));
//!
//! // The original is untouched.
//! assert_eq!(doc, Document::from(json!({"a": {"b": 1}})));
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;

pub mod apply;
pub mod codec;
pub mod restore;
pub mod types;

pub use apply::{apply_operation, set_value};
pub use codec::json::{decode_operation, encode_operation};
pub use restore::{assign_restorable, assign_restorable_at, Restorable};
pub use types::{
    BitAssignment, BitwiseOp, CurrentDateType, OperandMap, PopFrom, PushModifier, SortDirection,
    UpdateError, UpdateOperation, UpdateOperator,
};

// The value and path types are part of this crate's surface.
pub use doc_path::DotPath;
pub use doc_value::{Document, Number};

/// Applies an operator document and returns the rebuilt tree.
///
/// The wall clock read for `$currentDate` is the single point of
/// non-determinism; use [`assign_at`] to inject it.
pub fn assign(doc: &Document, operation: &UpdateOperation) -> Result<Document, UpdateError> {
    apply_operation(doc, operation, Utc::now())
}

/// [`assign`] with an injected `$currentDate` instant, so the same
/// `(document, operation)` pair is reproducible.
pub fn assign_at(
    doc: &Document,
    operation: &UpdateOperation,
    now: DateTime<Utc>,
) -> Result<Document, UpdateError> {
    apply_operation(doc, operation, now)
}

/// JSON-boundary convenience: decodes both sides, applies, re-encodes.
pub fn assign_json(doc: &Value, operation: &Value) -> Result<Value, UpdateError> {
    let decoded = decode_operation(operation)?;
    let updated = assign(&Document::from(doc.clone()), &decoded)?;
    Ok(updated.to_json())
}

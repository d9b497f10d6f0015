//! Rehydration of typed values.
//!
//! The engine itself is document-only. Callers that keep their entities as
//! concrete Rust types opt in by implementing [`Restorable`]: the entity is
//! lowered to a [`Document`], updated, and rebuilt from the updated field
//! set — so the result is a value of the original type with only the
//! targeted fields changed.

use chrono::{DateTime, Utc};

use doc_value::Document;

use crate::apply::apply_operation;
use crate::types::{UpdateError, UpdateOperation};

/// A concrete record type that can round-trip through the document form.
///
/// `from_document` is the canonical "build from a plain field set"
/// constructor; it should report [`UpdateError::Restore`] when the updated
/// fields no longer fit the type.
pub trait Restorable: Sized {
    fn to_document(&self) -> Document;
    fn from_document(doc: &Document) -> Result<Self, UpdateError>;
}

/// Applies an operator document to a typed value, preserving its type.
pub fn assign_restorable<T: Restorable>(
    obj: &T,
    operation: &UpdateOperation,
) -> Result<T, UpdateError> {
    assign_restorable_at(obj, operation, Utc::now())
}

/// [`assign_restorable`] with an injected clock for `$currentDate`.
pub fn assign_restorable_at<T: Restorable>(
    obj: &T,
    operation: &UpdateOperation,
    now: DateTime<Utc>,
) -> Result<T, UpdateError> {
    let updated = apply_operation(&obj.to_document(), operation, now)?;
    T::from_document(&updated)
}

//! The typed operator model and the engine's error taxonomy.

use indexmap::IndexMap;
use thiserror::Error;

use doc_path::PathError;
use doc_query::QueryCondition;
use doc_value::{Document, Number};

/// Per-operator mapping from dot-notation path to operand, in the order the
/// paths were written.
pub type OperandMap<T> = IndexMap<String, T>;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpdateError {
    /// The operator-document key is not a recognized operator tag.
    #[error("invalid operator \"{0}\"")]
    InvalidOperator(String),

    /// Recognized but intentionally unsupported operator.
    #[error("operator \"{0}\" is not implemented")]
    OperatorNotImplemented(&'static str),

    /// Operand or current value has the wrong shape for the operator.
    #[error("{operator} requires {expected} at \"{path}\"")]
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        path: String,
    },

    /// Arithmetic applied where the current value is absent or null.
    #[error("{operator} applied to an absent or null value at \"{path}\"")]
    NullOperand {
        operator: &'static str,
        path: String,
    },

    /// A dot-notation path descended through a missing intermediate
    /// container.
    #[error("path \"{0}\" does not exist")]
    PathNotFound(String),

    /// A typed value could not be rebuilt from the updated field set.
    #[error("cannot restore {type_name}: {reason}")]
    Restore {
        type_name: &'static str,
        reason: String,
    },
}

impl From<PathError> for UpdateError {
    fn from(err: PathError) -> UpdateError {
        match err {
            PathError::Empty => UpdateError::PathNotFound(String::new()),
            PathError::NotFound(path) => UpdateError::PathNotFound(path),
        }
    }
}

// ── Operator operands ─────────────────────────────────────────────────────

/// Which end `$pop` removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopFrom {
    /// Operand `1`: drop the final element.
    Last,
    /// Any other operand: drop the first element.
    First,
}

/// What `$currentDate` writes: a date value or the epoch-millisecond
/// integer of the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentDateType {
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// A single bitwise assignment; exactly one of `and`/`or`/`xor` is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitAssignment {
    pub op: BitwiseOp,
    pub operand: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub(crate) fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The `$push` modifier. A plain pushed value is the one-element `each`
/// with every other knob unset.
#[derive(Debug, Clone, Default)]
pub struct PushModifier {
    /// Values inserted at `position`, preserving their relative order.
    pub each: Vec<Document>,
    /// Post-insert truncation, JS `slice(0, n)` semantics: a negative
    /// count keeps `len + n` elements from the front.
    pub slice: Option<i64>,
    /// Stable multi-field sort applied after insertion; first differing
    /// field wins.
    pub sort: Option<IndexMap<String, SortDirection>>,
    /// Insertion index, clamped to the array length; default is the end.
    pub position: Option<usize>,
}

impl PushModifier {
    /// The modifier a plain (non-`$each`) operand normalizes to.
    pub fn single(value: Document) -> PushModifier {
        PushModifier {
            each: vec![value],
            ..PushModifier::default()
        }
    }

    /// True when the modifier is just a one-value insert at the end.
    pub(crate) fn is_plain(&self) -> bool {
        self.each.len() == 1
            && self.slice.is_none()
            && self.sort.is_none()
            && self.position.is_none()
    }
}

// ── Operators ─────────────────────────────────────────────────────────────

/// One update operator with its operand map.
///
/// The supported set is closed: unknown tags are rejected at the JSON
/// boundary with [`UpdateError::InvalidOperator`], and the three recognized
/// but unsupported tags fail at dispatch with
/// [`UpdateError::OperatorNotImplemented`].
#[derive(Debug, Clone)]
pub enum UpdateOperator {
    Set(OperandMap<Document>),
    Inc(OperandMap<Number>),
    Min(OperandMap<Document>),
    Max(OperandMap<Document>),
    Mul(OperandMap<Number>),
    AddToSet(OperandMap<Vec<Document>>),
    Pop(OperandMap<PopFrom>),
    Pull(OperandMap<QueryCondition>),
    Push(OperandMap<PushModifier>),
    CurrentDate(OperandMap<CurrentDateType>),
    Bit(OperandMap<BitAssignment>),

    // Recognized names that the engine deliberately does not implement.
    Rename(OperandMap<Document>),
    Unset(OperandMap<Document>),
    SetOnInsert(OperandMap<Document>),
}

impl UpdateOperator {
    /// The operator's wire tag.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOperator::Set(_) => "$set",
            UpdateOperator::Inc(_) => "$inc",
            UpdateOperator::Min(_) => "$min",
            UpdateOperator::Max(_) => "$max",
            UpdateOperator::Mul(_) => "$mul",
            UpdateOperator::AddToSet(_) => "$addToSet",
            UpdateOperator::Pop(_) => "$pop",
            UpdateOperator::Pull(_) => "$pull",
            UpdateOperator::Push(_) => "$push",
            UpdateOperator::CurrentDate(_) => "$currentDate",
            UpdateOperator::Bit(_) => "$bit",
            UpdateOperator::Rename(_) => "$rename",
            UpdateOperator::Unset(_) => "$unset",
            UpdateOperator::SetOnInsert(_) => "$setOnInsert",
        }
    }
}

/// An ordered operator document: operators apply in the order they were
/// written, and later operators observe the writes of earlier ones.
#[derive(Debug, Clone, Default)]
pub struct UpdateOperation {
    operators: Vec<UpdateOperator>,
}

impl UpdateOperation {
    pub fn new() -> UpdateOperation {
        UpdateOperation::default()
    }

    pub fn push(&mut self, operator: UpdateOperator) {
        self.operators.push(operator);
    }

    pub fn operators(&self) -> &[UpdateOperator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl From<Vec<UpdateOperator>> for UpdateOperation {
    fn from(operators: Vec<UpdateOperator>) -> UpdateOperation {
        UpdateOperation { operators }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names() {
        assert_eq!(UpdateOperator::Set(OperandMap::new()).name(), "$set");
        assert_eq!(
            UpdateOperator::AddToSet(OperandMap::new()).name(),
            "$addToSet"
        );
        assert_eq!(
            UpdateOperator::SetOnInsert(OperandMap::new()).name(),
            "$setOnInsert"
        );
    }

    #[test]
    fn path_errors_become_path_not_found() {
        let err: UpdateError = PathError::NotFound("a.b".into()).into();
        assert_eq!(err, UpdateError::PathNotFound("a.b".into()));
    }

    #[test]
    fn plain_push_modifier() {
        let modifier = PushModifier::single(Document::Int(1));
        assert!(modifier.is_plain());

        let with_slice = PushModifier {
            slice: Some(2),
            ..PushModifier::single(Document::Int(1))
        };
        assert!(!with_slice.is_plain());
    }
}

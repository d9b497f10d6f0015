//! Operator application: the copy-on-write writer, one handler per
//! operator, and the dispatching fold.
//!
//! Every handler reads current values from its input document, computes a
//! flat path→value map, and reduces to [`set_value`] — so all writing goes
//! through one reconstruction routine. Nothing is ever mutated in place;
//! on error the caller simply never receives a result.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use doc_path::{ancestors, DotPath};
use doc_query::{filter_out, QueryCondition};
use doc_value::{compare, deep_equal, Document, Number};

use crate::types::{
    BitAssignment, BitwiseOp, CurrentDateType, OperandMap, PopFrom, PushModifier, SortDirection,
    UpdateError, UpdateOperation, UpdateOperator,
};

// ── Copy-on-write writer ──────────────────────────────────────────────────

/// Rebuilds `doc` with `value` written at `path`.
///
/// Resolves the ancestor chain, then folds from the path's last key to its
/// first, producing one shallow container copy per level. Allocation is
/// O(depth); every untouched branch stays reference-shared with the input.
///
/// # Errors
///
/// [`UpdateError::PathNotFound`] when an intermediate container is missing
/// or the write lands beyond an array's end; writing never creates
/// intermediate containers.
pub fn set_value(doc: &Document, path: &DotPath, value: Document) -> Result<Document, UpdateError> {
    let chain = ancestors(doc, path)?;
    let mut updated = value;
    for (container, key) in chain.iter().zip(path.keys()).rev() {
        updated = with_key(container, key, updated, path)?;
    }
    Ok(updated)
}

/// Shallow-copies one container with a single key replaced.
fn with_key(
    container: &Document,
    key: &str,
    value: Document,
    path: &DotPath,
) -> Result<Document, UpdateError> {
    match container {
        Document::Object(fields) => {
            // An existing key keeps its position; a new key appends.
            let mut copy = (**fields).clone();
            copy.insert(key.to_string(), value);
            Ok(Document::object(copy))
        }
        Document::Array(items) => {
            let index: usize = key.parse().map_err(|_| UpdateError::TypeMismatch {
                operator: "$set",
                expected: "a numeric index",
                path: path.format(),
            })?;
            let mut copy = (**items).clone();
            if index < copy.len() {
                copy[index] = value;
            } else if index == copy.len() {
                copy.push(value);
            } else {
                return Err(UpdateError::PathNotFound(path.format()));
            }
            Ok(Document::array(copy))
        }
        _ => Err(UpdateError::PathNotFound(path.format())),
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────

/// Folds the operators over the document in document order.
///
/// `now` is the instant `$currentDate` writes — the single point of
/// non-determinism, injected so the same call can be replayed.
pub fn apply_operation(
    doc: &Document,
    operation: &UpdateOperation,
    now: DateTime<Utc>,
) -> Result<Document, UpdateError> {
    let mut updated = doc.clone();
    for operator in operation.operators() {
        updated = apply_operator(&updated, operator, now)?;
    }
    Ok(updated)
}

fn apply_operator(
    doc: &Document,
    operator: &UpdateOperator,
    now: DateTime<Utc>,
) -> Result<Document, UpdateError> {
    match operator {
        UpdateOperator::Set(operands) => apply_set(doc, operands),
        UpdateOperator::Inc(operands) => apply_inc(doc, operands),
        UpdateOperator::Min(operands) => apply_min(doc, operands),
        UpdateOperator::Max(operands) => apply_max(doc, operands),
        UpdateOperator::Mul(operands) => apply_mul(doc, operands),
        UpdateOperator::AddToSet(operands) => apply_add_to_set(doc, operands),
        UpdateOperator::Pop(operands) => apply_pop(doc, operands),
        UpdateOperator::Pull(operands) => apply_pull(doc, operands),
        UpdateOperator::Push(operands) => apply_push(doc, operands),
        UpdateOperator::CurrentDate(operands) => apply_current_date(doc, operands, now),
        UpdateOperator::Bit(operands) => apply_bit(doc, operands),
        UpdateOperator::Rename(_) | UpdateOperator::Unset(_) | UpdateOperator::SetOnInsert(_) => {
            Err(UpdateError::OperatorNotImplemented(operator.name()))
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// `$set` — writes each operand verbatim. Also the write stage every other
/// handler reduces to, folding paths in operand-map order so overlapping
/// paths observe earlier writes.
fn apply_set(doc: &Document, operands: &OperandMap<Document>) -> Result<Document, UpdateError> {
    let mut updated = doc.clone();
    for (path, value) in operands {
        let parsed = DotPath::parse(path)?;
        updated = set_value(&updated, &parsed, value.clone())?;
    }
    Ok(updated)
}

/// `$inc` — `current + operand`; the current value must be numeric, there
/// is no default-to-zero.
fn apply_inc(doc: &Document, operands: &OperandMap<Number>) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, operand) in operands {
        let current = read(doc, path)?
            .and_then(Document::as_number)
            .ok_or_else(|| UpdateError::TypeMismatch {
                operator: "$inc",
                expected: "a numeric current value",
                path: path.clone(),
            })?;
        values.insert(path.clone(), Document::from(current.add(*operand)));
    }
    apply_set(doc, &values)
}

/// `$min` — writes the operand only when it orders below the current
/// value; absent or incomparable current values are left alone.
fn apply_min(doc: &Document, operands: &OperandMap<Document>) -> Result<Document, UpdateError> {
    let mut values = OperandMap::new();
    for (path, operand) in operands {
        if let Some(current) = read(doc, path)? {
            if compare(operand, current) == Some(Ordering::Less) {
                values.insert(path.clone(), operand.clone());
            }
        }
    }
    apply_set(doc, &values)
}

/// `$max` — mirror of `$min`.
fn apply_max(doc: &Document, operands: &OperandMap<Document>) -> Result<Document, UpdateError> {
    let mut values = OperandMap::new();
    for (path, operand) in operands {
        if let Some(current) = read(doc, path)? {
            if compare(operand, current) == Some(Ordering::Greater) {
                values.insert(path.clone(), operand.clone());
            }
        }
    }
    apply_set(doc, &values)
}

/// `$mul` — `current * operand`; an absent or null current value is a
/// [`UpdateError::NullOperand`].
fn apply_mul(doc: &Document, operands: &OperandMap<Number>) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, operand) in operands {
        let current = match read(doc, path)? {
            None | Some(Document::Null) => {
                return Err(UpdateError::NullOperand {
                    operator: "$mul",
                    path: path.clone(),
                })
            }
            Some(value) => value.as_number().ok_or_else(|| UpdateError::TypeMismatch {
                operator: "$mul",
                expected: "a numeric current value",
                path: path.clone(),
            })?,
        };
        values.insert(path.clone(), Document::from(current.mul(*operand)));
    }
    apply_set(doc, &values)
}

/// `$addToSet` — appends the operand values that are not structurally
/// equal to any element already in the array; existing order is kept.
fn apply_add_to_set(
    doc: &Document,
    operands: &OperandMap<Vec<Document>>,
) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, each) in operands {
        let mut array = array_or_default(doc, path, "$addToSet")?;
        let additions: Vec<Document> = each
            .iter()
            .filter(|value| !array.iter().any(|existing| deep_equal(existing, value)))
            .cloned()
            .collect();
        array.extend(additions);
        values.insert(path.clone(), Document::array(array));
    }
    apply_set(doc, &values)
}

/// `$pop` — drops one element from the chosen end; an empty (or absent)
/// array stays empty.
fn apply_pop(doc: &Document, operands: &OperandMap<PopFrom>) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, end) in operands {
        let mut array = array_or_default(doc, path, "$pop")?;
        match end {
            PopFrom::Last => {
                array.pop();
            }
            PopFrom::First => {
                if !array.is_empty() {
                    array.remove(0);
                }
            }
        }
        values.insert(path.clone(), Document::array(array));
    }
    apply_set(doc, &values)
}

/// `$pull` — keeps the elements the predicate evaluator reports as
/// non-matching. An absent field is a no-op: it is not created.
fn apply_pull(
    doc: &Document,
    operands: &OperandMap<QueryCondition>,
) -> Result<Document, UpdateError> {
    let mut values = OperandMap::new();
    for (path, condition) in operands {
        match read(doc, path)? {
            None => continue,
            Some(Document::Array(items)) => {
                values.insert(path.clone(), Document::array(filter_out(items, condition)));
            }
            Some(_) => {
                return Err(UpdateError::TypeMismatch {
                    operator: "$pull",
                    expected: "an array",
                    path: path.clone(),
                })
            }
        }
    }
    apply_set(doc, &values)
}

/// `$push` — inserts `each` at `position`, then sorts, then slices.
fn apply_push(
    doc: &Document,
    operands: &OperandMap<PushModifier>,
) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, modifier) in operands {
        let mut array = array_or_default(doc, path, "$push")?;

        let position = modifier.position.unwrap_or(array.len()).min(array.len());
        array.splice(position..position, modifier.each.iter().cloned());

        if let Some(sort) = &modifier.sort {
            let mut sort_keys = Vec::with_capacity(sort.len());
            for (field, direction) in sort {
                sort_keys.push((DotPath::parse(field)?, *direction));
            }
            array.sort_by(|a, b| compare_by_fields(a, b, &sort_keys));
        }

        if let Some(count) = modifier.slice {
            let end = if count < 0 {
                array.len().saturating_sub(count.unsigned_abs() as usize)
            } else {
                (count as usize).min(array.len())
            };
            array.truncate(end);
        }

        values.insert(path.clone(), Document::array(array));
    }
    apply_set(doc, &values)
}

/// Stable multi-field ordering for `$push.$sort`: the first field that
/// orders the two elements wins; missing or incomparable fields keep the
/// insertion order.
fn compare_by_fields(
    a: &Document,
    b: &Document,
    sort_keys: &[(DotPath, SortDirection)],
) -> Ordering {
    for (field, direction) in sort_keys {
        let va = doc_path::get(a, field).ok().flatten();
        let vb = doc_path::get(b, field).ok().flatten();
        if let (Some(x), Some(y)) = (va, vb) {
            match compare(x, y) {
                Some(ordering) if ordering != Ordering::Equal => {
                    return direction.apply(ordering)
                }
                _ => {}
            }
        }
    }
    Ordering::Equal
}

/// `$currentDate` — writes the injected instant, as a date value or as
/// epoch milliseconds.
fn apply_current_date(
    doc: &Document,
    operands: &OperandMap<CurrentDateType>,
    now: DateTime<Utc>,
) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, kind) in operands {
        let value = match kind {
            CurrentDateType::Date => Document::Date(now),
            CurrentDateType::Timestamp => Document::Int(now.timestamp_millis()),
        };
        values.insert(path.clone(), value);
    }
    apply_set(doc, &values)
}

/// `$bit` — bitwise and/or/xor against an integer current value
/// (absent defaults to 0).
fn apply_bit(
    doc: &Document,
    operands: &OperandMap<BitAssignment>,
) -> Result<Document, UpdateError> {
    let mut values = OperandMap::with_capacity(operands.len());
    for (path, assignment) in operands {
        let current = match read(doc, path)? {
            None => 0,
            Some(Document::Int(i)) => *i,
            Some(_) => {
                return Err(UpdateError::TypeMismatch {
                    operator: "$bit",
                    expected: "an integer current value",
                    path: path.clone(),
                })
            }
        };
        let result = match assignment.op {
            BitwiseOp::And => current & assignment.operand,
            BitwiseOp::Or => current | assignment.operand,
            BitwiseOp::Xor => current ^ assignment.operand,
        };
        values.insert(path.clone(), Document::Int(result));
    }
    apply_set(doc, &values)
}

// ── Shared lookups ────────────────────────────────────────────────────────

/// Reads the current value at a path string; absent leaves are `None`.
fn read<'a>(doc: &'a Document, path: &str) -> Result<Option<&'a Document>, UpdateError> {
    let parsed = DotPath::parse(path)?;
    Ok(doc_path::get(doc, &parsed)?)
}

/// The array-operator preamble: absent fields default to an empty array,
/// non-array fields are a type error.
fn array_or_default(
    doc: &Document,
    path: &str,
    operator: &'static str,
) -> Result<Vec<Document>, UpdateError> {
    match read(doc, path)? {
        None => Ok(Vec::new()),
        Some(Document::Array(items)) => Ok((**items).clone()),
        Some(_) => Err(UpdateError::TypeMismatch {
            operator,
            expected: "an array",
            path: path.to_string(),
        }),
    }
}

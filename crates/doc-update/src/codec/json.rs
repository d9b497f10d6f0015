//! JSON codec for operator documents.
//!
//! Decoding walks the operator object's keys in document order — the order
//! operators later apply in — and validates every operator tag and operand
//! shape at this boundary, so the typed model only ever holds the closed,
//! well-formed operator set.

use serde_json::{json, Value};

use doc_query::QueryCondition;
use doc_value::{Document, Number};

use crate::types::{
    BitAssignment, BitwiseOp, CurrentDateType, OperandMap, PopFrom, PushModifier, SortDirection,
    UpdateError, UpdateOperation, UpdateOperator,
};

// ── Decoding ──────────────────────────────────────────────────────────────

/// Decodes an operator document from its JSON form.
///
/// # Errors
///
/// [`UpdateError::InvalidOperator`] for an unrecognized operator key;
/// [`UpdateError::TypeMismatch`] for a malformed operand.
///
/// # Example
///
/// ```
/// use doc_update::codec::json::decode_operation;
/// use serde_json::json;
///
/// let operation = decode_operation(&json!({"$inc": {"a.b": 2}})).unwrap();
/// assert_eq!(operation.operators().len(), 1);
/// ```
pub fn decode_operation(value: &Value) -> Result<UpdateOperation, UpdateError> {
    let map = value.as_object().ok_or_else(|| UpdateError::TypeMismatch {
        operator: "assign",
        expected: "an object keyed by operator",
        path: String::new(),
    })?;
    let mut operators = Vec::with_capacity(map.len());
    for (name, operand) in map {
        operators.push(decode_operator(name, operand)?);
    }
    Ok(UpdateOperation::from(operators))
}

fn decode_operator(name: &str, operand: &Value) -> Result<UpdateOperator, UpdateError> {
    Ok(match name {
        "$set" => UpdateOperator::Set(decode_operands("$set", operand, document_operand)?),
        "$inc" => UpdateOperator::Inc(decode_operands("$inc", operand, |path, v| {
            number_operand("$inc", path, v)
        })?),
        "$min" => UpdateOperator::Min(decode_operands("$min", operand, document_operand)?),
        "$max" => UpdateOperator::Max(decode_operands("$max", operand, document_operand)?),
        "$mul" => UpdateOperator::Mul(decode_operands("$mul", operand, |path, v| {
            number_operand("$mul", path, v)
        })?),
        "$addToSet" => {
            UpdateOperator::AddToSet(decode_operands("$addToSet", operand, each_operand)?)
        }
        "$pop" => UpdateOperator::Pop(decode_operands("$pop", operand, pop_operand)?),
        "$pull" => UpdateOperator::Pull(decode_operands("$pull", operand, pull_operand)?),
        "$push" => UpdateOperator::Push(decode_operands("$push", operand, push_operand)?),
        "$currentDate" => UpdateOperator::CurrentDate(decode_operands(
            "$currentDate",
            operand,
            current_date_operand,
        )?),
        "$bit" => UpdateOperator::Bit(decode_operands("$bit", operand, bit_operand)?),
        "$rename" => UpdateOperator::Rename(decode_operands("$rename", operand, document_operand)?),
        "$unset" => UpdateOperator::Unset(decode_operands("$unset", operand, document_operand)?),
        "$setOnInsert" => UpdateOperator::SetOnInsert(decode_operands(
            "$setOnInsert",
            operand,
            document_operand,
        )?),
        other => return Err(UpdateError::InvalidOperator(other.to_string())),
    })
}

fn decode_operands<T>(
    operator: &'static str,
    operand: &Value,
    decode: impl Fn(&str, &Value) -> Result<T, UpdateError>,
) -> Result<OperandMap<T>, UpdateError> {
    let map = operand.as_object().ok_or_else(|| UpdateError::TypeMismatch {
        operator,
        expected: "an object of dot-notation paths",
        path: String::new(),
    })?;
    let mut out = OperandMap::with_capacity(map.len());
    for (path, value) in map {
        out.insert(path.clone(), decode(path, value)?);
    }
    Ok(out)
}

fn mismatch(operator: &'static str, expected: &'static str, path: &str) -> UpdateError {
    UpdateError::TypeMismatch {
        operator,
        expected,
        path: path.to_string(),
    }
}

fn document_operand(_path: &str, value: &Value) -> Result<Document, UpdateError> {
    Ok(Document::from(value))
}

fn number_operand(
    operator: &'static str,
    path: &str,
    value: &Value,
) -> Result<Number, UpdateError> {
    Document::from(value)
        .as_number()
        .ok_or_else(|| mismatch(operator, "a numeric operand", path))
}

/// `$addToSet` operand: a `{"$each": [...]}` modifier or a single value.
fn each_operand(path: &str, value: &Value) -> Result<Vec<Document>, UpdateError> {
    if let Some(each) = value.as_object().and_then(|obj| obj.get("$each")) {
        let items = each
            .as_array()
            .ok_or_else(|| mismatch("$addToSet", "an array for \"$each\"", path))?;
        return Ok(items.iter().map(Document::from).collect());
    }
    Ok(vec![Document::from(value)])
}

/// `$pop` operand: `1` drops the last element, anything else the first.
fn pop_operand(_path: &str, value: &Value) -> Result<PopFrom, UpdateError> {
    if value.as_i64() == Some(1) {
        Ok(PopFrom::Last)
    } else {
        Ok(PopFrom::First)
    }
}

fn pull_operand(path: &str, value: &Value) -> Result<QueryCondition, UpdateError> {
    QueryCondition::from_document(&Document::from(value))
        .map_err(|_| mismatch("$pull", "a value or query condition", path))
}

/// `$push` operand: a `{"$each", "$slice"?, "$sort"?, "$position"?}`
/// modifier, or a single value pushed to the end.
fn push_operand(path: &str, value: &Value) -> Result<PushModifier, UpdateError> {
    let modifier_obj = match value.as_object() {
        Some(obj) if obj.contains_key("$each") => obj,
        _ => return Ok(PushModifier::single(Document::from(value))),
    };

    let items = modifier_obj
        .get("$each")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("$push", "an array for \"$each\"", path))?;
    let mut modifier = PushModifier {
        each: items.iter().map(Document::from).collect(),
        ..PushModifier::default()
    };

    if let Some(slice) = modifier_obj.get("$slice") {
        modifier.slice = Some(
            slice
                .as_i64()
                .ok_or_else(|| mismatch("$push", "an integer for \"$slice\"", path))?,
        );
    }

    if let Some(sort) = modifier_obj.get("$sort") {
        let fields = sort
            .as_object()
            .ok_or_else(|| mismatch("$push", "an object for \"$sort\"", path))?;
        let mut directions = OperandMap::with_capacity(fields.len());
        for (field, direction) in fields {
            let direction = match direction.as_i64() {
                Some(1) => SortDirection::Ascending,
                Some(-1) => SortDirection::Descending,
                _ => return Err(mismatch("$push", "1 or -1 for \"$sort\" directions", path)),
            };
            directions.insert(field.clone(), direction);
        }
        modifier.sort = Some(directions);
    }

    if let Some(position) = modifier_obj.get("$position") {
        let position = position
            .as_u64()
            .ok_or_else(|| mismatch("$push", "a non-negative integer for \"$position\"", path))?;
        modifier.position = Some(position as usize);
    }

    Ok(modifier)
}

/// `$currentDate` operand: `true` or `{"$type": "date" | "timestamp"}`.
fn current_date_operand(path: &str, value: &Value) -> Result<CurrentDateType, UpdateError> {
    match value {
        Value::Bool(true) => Ok(CurrentDateType::Date),
        Value::Object(obj) => match obj.get("$type").and_then(Value::as_str) {
            Some("date") => Ok(CurrentDateType::Date),
            Some("timestamp") => Ok(CurrentDateType::Timestamp),
            _ => Err(mismatch(
                "$currentDate",
                "a \"$type\" of \"date\" or \"timestamp\"",
                path,
            )),
        },
        _ => Err(mismatch(
            "$currentDate",
            "true or a \"$type\" specification",
            path,
        )),
    }
}

/// `$bit` operand: the first recognized of `and`/`or`/`xor` is honored.
fn bit_operand(path: &str, value: &Value) -> Result<BitAssignment, UpdateError> {
    let obj = value
        .as_object()
        .ok_or_else(|| mismatch("$bit", "an and/or/xor assignment", path))?;
    for (key, operand) in obj {
        let op = match key.as_str() {
            "and" => BitwiseOp::And,
            "or" => BitwiseOp::Or,
            "xor" => BitwiseOp::Xor,
            _ => continue,
        };
        let operand = operand
            .as_i64()
            .ok_or_else(|| mismatch("$bit", "an integer operand", path))?;
        return Ok(BitAssignment { op, operand });
    }
    Err(mismatch("$bit", "one of \"and\", \"or\" or \"xor\"", path))
}

// ── Encoding ──────────────────────────────────────────────────────────────

/// Re-encodes an operator document into its canonical JSON form.
///
/// Canonical means normalized operands: `$addToSet` always uses the
/// `$each` form, `$pop` encodes as `1`/`-1`, and a plain `$push` encodes
/// back to the bare value.
pub fn encode_operation(operation: &UpdateOperation) -> Value {
    let mut map = serde_json::Map::with_capacity(operation.operators().len());
    for operator in operation.operators() {
        map.insert(operator.name().to_string(), encode_operands(operator));
    }
    Value::Object(map)
}

fn encode_operands(operator: &UpdateOperator) -> Value {
    match operator {
        UpdateOperator::Set(m)
        | UpdateOperator::Min(m)
        | UpdateOperator::Max(m)
        | UpdateOperator::Rename(m)
        | UpdateOperator::Unset(m)
        | UpdateOperator::SetOnInsert(m) => encode_map(m, Document::to_json),
        UpdateOperator::Inc(m) | UpdateOperator::Mul(m) => {
            encode_map(m, |n| Document::from(*n).to_json())
        }
        UpdateOperator::AddToSet(m) => encode_map(m, |each| {
            json!({"$each": each.iter().map(Document::to_json).collect::<Vec<_>>()})
        }),
        UpdateOperator::Pop(m) => encode_map(m, |end| match end {
            PopFrom::Last => json!(1),
            PopFrom::First => json!(-1),
        }),
        UpdateOperator::Pull(m) => encode_map(m, |condition| condition.to_document().to_json()),
        UpdateOperator::Push(m) => encode_map(m, encode_push),
        UpdateOperator::CurrentDate(m) => encode_map(m, |kind| match kind {
            CurrentDateType::Date => json!(true),
            CurrentDateType::Timestamp => json!({"$type": "timestamp"}),
        }),
        UpdateOperator::Bit(m) => encode_map(m, |assignment| {
            let key = match assignment.op {
                BitwiseOp::And => "and",
                BitwiseOp::Or => "or",
                BitwiseOp::Xor => "xor",
            };
            let mut obj = serde_json::Map::with_capacity(1);
            obj.insert(key.to_string(), json!(assignment.operand));
            Value::Object(obj)
        }),
    }
}

fn encode_map<T>(map: &OperandMap<T>, encode: impl Fn(&T) -> Value) -> Value {
    let mut out = serde_json::Map::with_capacity(map.len());
    for (path, operand) in map {
        out.insert(path.clone(), encode(operand));
    }
    Value::Object(out)
}

fn encode_push(modifier: &PushModifier) -> Value {
    if modifier.is_plain() {
        return modifier.each[0].to_json();
    }
    let mut obj = serde_json::Map::new();
    obj.insert(
        "$each".to_string(),
        Value::Array(modifier.each.iter().map(Document::to_json).collect()),
    );
    if let Some(count) = modifier.slice {
        obj.insert("$slice".to_string(), json!(count));
    }
    if let Some(sort) = &modifier.sort {
        let mut fields = serde_json::Map::with_capacity(sort.len());
        for (field, direction) in sort {
            let direction = match direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            fields.insert(field.clone(), json!(direction));
        }
        obj.insert("$sort".to_string(), Value::Object(fields));
    }
    if let Some(position) = modifier.position {
        obj.insert("$position".to_string(), json!(position));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operators_in_document_order() {
        let operation =
            decode_operation(&json!({"$inc": {"n": 1}, "$set": {"n": 5}, "$max": {"m": 2}}))
                .unwrap();
        let names: Vec<&str> = operation.operators().iter().map(|op| op.name()).collect();
        assert_eq!(names, ["$inc", "$set", "$max"]);
    }

    #[test]
    fn rejects_unknown_operators() {
        assert!(matches!(
            decode_operation(&json!({"$foo": {"a": 1}})),
            Err(UpdateError::InvalidOperator(name)) if name == "$foo"
        ));
    }

    #[test]
    fn rejects_non_object_operator_documents() {
        assert!(matches!(
            decode_operation(&json!([1, 2])),
            Err(UpdateError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_non_object_operands() {
        assert!(matches!(
            decode_operation(&json!({"$set": 5})),
            Err(UpdateError::TypeMismatch { operator: "$set", .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_inc_operands() {
        assert!(matches!(
            decode_operation(&json!({"$inc": {"n": "one"}})),
            Err(UpdateError::TypeMismatch { operator: "$inc", .. })
        ));
    }

    #[test]
    fn plain_add_to_set_normalizes_to_each() {
        let operation = decode_operation(&json!({"$addToSet": {"tags": "x"}})).unwrap();
        match &operation.operators()[0] {
            UpdateOperator::AddToSet(operands) => {
                assert_eq!(operands["tags"], vec![Document::String("x".into())]);
            }
            other => panic!("expected $addToSet, got {other:?}"),
        }
    }

    #[test]
    fn pop_operand_is_one_or_anything() {
        let operation =
            decode_operation(&json!({"$pop": {"a": 1, "b": -1, "c": true}})).unwrap();
        match &operation.operators()[0] {
            UpdateOperator::Pop(operands) => {
                assert_eq!(operands["a"], PopFrom::Last);
                assert_eq!(operands["b"], PopFrom::First);
                assert_eq!(operands["c"], PopFrom::First);
            }
            other => panic!("expected $pop, got {other:?}"),
        }
    }

    #[test]
    fn push_modifier_decodes_every_knob() {
        let operation = decode_operation(&json!({"$push": {"scores": {
            "$each": [1, 2],
            "$slice": 3,
            "$sort": {"score": -1},
            "$position": 0
        }}}))
        .unwrap();
        match &operation.operators()[0] {
            UpdateOperator::Push(operands) => {
                let modifier = &operands["scores"];
                assert_eq!(modifier.each.len(), 2);
                assert_eq!(modifier.slice, Some(3));
                assert_eq!(modifier.position, Some(0));
                assert_eq!(
                    modifier.sort.as_ref().unwrap()["score"],
                    SortDirection::Descending
                );
            }
            other => panic!("expected $push, got {other:?}"),
        }
    }

    #[test]
    fn push_object_without_each_is_a_plain_value() {
        let operation = decode_operation(&json!({"$push": {"log": {"level": "warn"}}})).unwrap();
        match &operation.operators()[0] {
            UpdateOperator::Push(operands) => {
                let modifier = &operands["log"];
                assert!(modifier.is_plain());
                assert_eq!(modifier.each[0], Document::from(json!({"level": "warn"})));
            }
            other => panic!("expected $push, got {other:?}"),
        }
    }

    #[test]
    fn push_rejects_bad_sort_directions() {
        assert!(matches!(
            decode_operation(&json!({"$push": {"a": {"$each": [], "$sort": {"x": 2}}}})),
            Err(UpdateError::TypeMismatch { operator: "$push", .. })
        ));
    }

    #[test]
    fn current_date_forms() {
        let operation = decode_operation(&json!({"$currentDate": {
            "a": true,
            "b": {"$type": "date"},
            "c": {"$type": "timestamp"}
        }}))
        .unwrap();
        match &operation.operators()[0] {
            UpdateOperator::CurrentDate(operands) => {
                assert_eq!(operands["a"], CurrentDateType::Date);
                assert_eq!(operands["b"], CurrentDateType::Date);
                assert_eq!(operands["c"], CurrentDateType::Timestamp);
            }
            other => panic!("expected $currentDate, got {other:?}"),
        }
    }

    #[test]
    fn current_date_rejects_false() {
        assert!(matches!(
            decode_operation(&json!({"$currentDate": {"a": false}})),
            Err(UpdateError::TypeMismatch { operator: "$currentDate", .. })
        ));
    }

    #[test]
    fn bit_takes_the_first_recognized_key() {
        let operation = decode_operation(&json!({"$bit": {"flags": {"xor": 1, "or": 2}}})).unwrap();
        match &operation.operators()[0] {
            UpdateOperator::Bit(operands) => {
                assert_eq!(
                    operands["flags"],
                    BitAssignment { op: BitwiseOp::Xor, operand: 1 }
                );
            }
            other => panic!("expected $bit, got {other:?}"),
        }
    }

    #[test]
    fn bit_rejects_unknown_assignments() {
        assert!(matches!(
            decode_operation(&json!({"$bit": {"flags": {"nand": 1}}})),
            Err(UpdateError::TypeMismatch { operator: "$bit", .. })
        ));
    }

    #[test]
    fn unimplemented_operators_still_decode() {
        // They are recognized names; rejection happens at dispatch.
        let operation = decode_operation(&json!({"$rename": {"a": "b"}})).unwrap();
        assert_eq!(operation.operators()[0].name(), "$rename");
    }

    #[test]
    fn encode_round_trips_decoded_operations() {
        for value in [
            json!({"$set": {"a.b": {"deep": [1, 2]}}}),
            json!({"$inc": {"n": 2}, "$mul": {"m": 3}}),
            json!({"$addToSet": {"tags": {"$each": ["a", "b"]}}}),
            json!({"$pop": {"first": -1, "last": 1}}),
            json!({"$push": {"scores": {"$each": [5], "$slice": 10, "$sort": {"score": -1}, "$position": 2}}}),
            json!({"$push": {"log": "plain"}}),
            json!({"$pull": {"items": {"score": {"$lt": 3}}}}),
            json!({"$currentDate": {"seen": true, "seenMs": {"$type": "timestamp"}}}),
            json!({"$bit": {"flags": {"xor": 5}}}),
        ] {
            let operation = decode_operation(&value).unwrap();
            assert_eq!(encode_operation(&operation), value, "for {value}");
        }
    }
}

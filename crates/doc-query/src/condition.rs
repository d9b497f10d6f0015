//! The condition type and its document form.

use indexmap::IndexMap;
use regex::Regex;

use doc_value::Document;

use crate::QueryError;

/// A condition over a single document value.
///
/// Conditions are decoded from their document form with
/// [`QueryCondition::from_document`]:
///
/// - a non-object value is an [`Eq`](QueryCondition::Eq) match on the
///   element itself;
/// - an object whose keys are all `$`-operators is the conjunction of those
///   comparisons, applied to the element itself;
/// - an object without `$`-keys is the conjunction of per-field conditions,
///   each field name a dot-notation path into the element.
#[derive(Debug, Clone)]
pub enum QueryCondition {
    Eq(Document),
    Ne(Document),
    Gt(Document),
    Gte(Document),
    Lt(Document),
    Lte(Document),
    In(Vec<Document>),
    Nin(Vec<Document>),
    Exists(bool),
    Regex(Regex),
    Not(Box<QueryCondition>),
    All(Vec<QueryCondition>),
    Field(String, Box<QueryCondition>),
}

impl QueryCondition {
    /// Decodes a condition from its document form.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidCondition`] for an unrecognized `$`-operator,
    /// a malformed operand, or an object mixing `$`-operator keys with
    /// field keys; [`QueryError::InvalidRegex`] for an uncompilable
    /// `$regex` pattern.
    pub fn from_document(operand: &Document) -> Result<QueryCondition, QueryError> {
        let fields = match operand.as_object() {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Ok(QueryCondition::Eq(operand.clone())),
        };

        let operator_keys = fields.keys().filter(|k| k.starts_with('$')).count();
        if operator_keys == fields.len() {
            let mut conditions = Vec::with_capacity(fields.len());
            for (name, value) in fields.iter() {
                conditions.push(comparison(name, value)?);
            }
            Ok(conjunction(conditions))
        } else if operator_keys == 0 {
            let mut conditions = Vec::with_capacity(fields.len());
            for (field, value) in fields.iter() {
                conditions.push(QueryCondition::Field(
                    field.clone(),
                    Box::new(value_condition(value)?),
                ));
            }
            Ok(conjunction(conditions))
        } else {
            Err(QueryError::InvalidCondition(
                "operator keys and field keys cannot be mixed".into(),
            ))
        }
    }

    /// Re-encodes the condition into its document form.
    pub fn to_document(&self) -> Document {
        match self {
            // A plain value decodes back to Eq; an object operand needs the
            // explicit form to avoid being re-read as field conditions.
            QueryCondition::Eq(v) => match v.as_object() {
                Some(_) => operator_object("$eq", v.clone()),
                None => v.clone(),
            },
            QueryCondition::Ne(v) => operator_object("$ne", v.clone()),
            QueryCondition::Gt(v) => operator_object("$gt", v.clone()),
            QueryCondition::Gte(v) => operator_object("$gte", v.clone()),
            QueryCondition::Lt(v) => operator_object("$lt", v.clone()),
            QueryCondition::Lte(v) => operator_object("$lte", v.clone()),
            QueryCondition::In(items) => operator_object("$in", Document::array(items.clone())),
            QueryCondition::Nin(items) => operator_object("$nin", Document::array(items.clone())),
            QueryCondition::Exists(want) => operator_object("$exists", Document::Bool(*want)),
            QueryCondition::Regex(re) => {
                operator_object("$regex", Document::String(re.as_str().to_string()))
            }
            QueryCondition::Not(inner) => operator_object("$not", inner.to_document()),
            QueryCondition::All(conditions) => {
                let mut map = IndexMap::new();
                for condition in conditions {
                    merge_into(&mut map, condition.to_document());
                }
                Document::object(map)
            }
            QueryCondition::Field(field, inner) => {
                let mut map = IndexMap::new();
                map.insert(field.clone(), inner.to_document());
                Document::object(map)
            }
        }
    }
}

/// Decodes the condition form allowed as a field value: an all-`$` object
/// is a comparison conjunction, anything else is an exact match.
fn value_condition(value: &Document) -> Result<QueryCondition, QueryError> {
    match value.as_object() {
        Some(fields) if !fields.is_empty() && fields.keys().all(|k| k.starts_with('$')) => {
            let mut conditions = Vec::with_capacity(fields.len());
            for (name, operand) in fields.iter() {
                conditions.push(comparison(name, operand)?);
            }
            Ok(conjunction(conditions))
        }
        _ => Ok(QueryCondition::Eq(value.clone())),
    }
}

fn comparison(name: &str, operand: &Document) -> Result<QueryCondition, QueryError> {
    Ok(match name {
        "$eq" => QueryCondition::Eq(operand.clone()),
        "$ne" => QueryCondition::Ne(operand.clone()),
        "$gt" => QueryCondition::Gt(operand.clone()),
        "$gte" => QueryCondition::Gte(operand.clone()),
        "$lt" => QueryCondition::Lt(operand.clone()),
        "$lte" => QueryCondition::Lte(operand.clone()),
        "$in" => QueryCondition::In(member_list(name, operand)?),
        "$nin" => QueryCondition::Nin(member_list(name, operand)?),
        "$exists" => QueryCondition::Exists(operand.as_bool().ok_or_else(|| {
            QueryError::InvalidCondition("\"$exists\" takes a boolean".into())
        })?),
        "$regex" => {
            let pattern = operand.as_str().ok_or_else(|| {
                QueryError::InvalidCondition("\"$regex\" takes a string pattern".into())
            })?;
            QueryCondition::Regex(
                Regex::new(pattern).map_err(|_| QueryError::InvalidRegex(pattern.to_string()))?,
            )
        }
        "$not" => QueryCondition::Not(Box::new(value_condition(operand)?)),
        other => {
            return Err(QueryError::InvalidCondition(format!(
                "unrecognized operator \"{other}\""
            )))
        }
    })
}

fn member_list(name: &str, operand: &Document) -> Result<Vec<Document>, QueryError> {
    operand
        .as_array()
        .map(<[Document]>::to_vec)
        .ok_or_else(|| QueryError::InvalidCondition(format!("\"{name}\" takes an array")))
}

fn conjunction(mut conditions: Vec<QueryCondition>) -> QueryCondition {
    if conditions.len() == 1 {
        conditions.swap_remove(0)
    } else {
        QueryCondition::All(conditions)
    }
}

fn operator_object(name: &str, value: Document) -> Document {
    let mut map = IndexMap::new();
    map.insert(name.to_string(), value);
    Document::object(map)
}

fn merge_into(map: &mut IndexMap<String, Document>, encoded: Document) {
    match encoded {
        Document::Object(fields) => {
            for (key, value) in fields.iter() {
                map.insert(key.clone(), value.clone());
            }
        }
        // A bare Eq inside a conjunction has no key of its own.
        other => {
            map.insert("$eq".to_string(), other);
        }
    }
}

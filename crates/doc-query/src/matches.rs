//! Condition evaluation.

use std::cmp::Ordering;

use doc_path::DotPath;
use doc_value::{compare, deep_equal, Document};

use crate::QueryCondition;

/// Returns `true` when `element` matches the condition.
pub fn matches(condition: &QueryCondition, element: &Document) -> bool {
    matches_at(condition, Some(element))
}

/// Returns the elements that do **not** match the condition, in their
/// original order.
///
/// This is the `$pull` contract: the result is the surviving array.
pub fn filter_out(elements: &[Document], condition: &QueryCondition) -> Vec<Document> {
    elements
        .iter()
        .filter(|element| !matches(condition, element))
        .cloned()
        .collect()
}

/// Evaluates a condition against a possibly-absent value.
///
/// Absence matters: `$exists: false`, `$ne` and `$nin` match an absent
/// field, everything else does not.
fn matches_at(condition: &QueryCondition, value: Option<&Document>) -> bool {
    match condition {
        QueryCondition::Eq(expected) => {
            value.map(|v| deep_equal(v, expected)).unwrap_or(false)
        }
        QueryCondition::Ne(expected) => {
            value.map(|v| !deep_equal(v, expected)).unwrap_or(true)
        }
        QueryCondition::Gt(bound) => ordered(value, bound, &[Ordering::Greater]),
        QueryCondition::Gte(bound) => ordered(value, bound, &[Ordering::Greater, Ordering::Equal]),
        QueryCondition::Lt(bound) => ordered(value, bound, &[Ordering::Less]),
        QueryCondition::Lte(bound) => ordered(value, bound, &[Ordering::Less, Ordering::Equal]),
        QueryCondition::In(set) => value
            .map(|v| set.iter().any(|candidate| deep_equal(v, candidate)))
            .unwrap_or(false),
        QueryCondition::Nin(set) => value
            .map(|v| !set.iter().any(|candidate| deep_equal(v, candidate)))
            .unwrap_or(true),
        QueryCondition::Exists(want) => value.is_some() == *want,
        QueryCondition::Regex(re) => value
            .and_then(Document::as_str)
            .map(|s| re.is_match(s))
            .unwrap_or(false),
        QueryCondition::Not(inner) => !matches_at(inner, value),
        QueryCondition::All(conditions) => {
            conditions.iter().all(|inner| matches_at(inner, value))
        }
        QueryCondition::Field(field, inner) => {
            let looked_up = value.and_then(|element| lookup(element, field));
            matches_at(inner, looked_up)
        }
    }
}

fn ordered(value: Option<&Document>, bound: &Document, accepted: &[Ordering]) -> bool {
    value
        .and_then(|v| compare(v, bound))
        .map(|ordering| accepted.contains(&ordering))
        .unwrap_or(false)
}

/// Field lookup inside an element; unresolvable paths behave as absent.
fn lookup<'a>(element: &'a Document, field: &str) -> Option<&'a Document> {
    let path = DotPath::parse(field).ok()?;
    doc_path::get(element, &path).ok().flatten()
}

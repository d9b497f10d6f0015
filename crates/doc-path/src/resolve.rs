//! Path resolution over document trees.
//!
//! Reading a missing *leaf* is an absent value, not an error, so operators
//! can apply default-when-absent semantics. Descending through a missing or
//! non-container *intermediate* fails with [`PathError::NotFound`] —
//! intermediate containers are never silently created.

use doc_value::Document;

use crate::{DotPath, PathError};

/// Descends one key into a container.
///
/// Returns `None` for a missing map field, an out-of-range or non-numeric
/// sequence index, or a non-container value.
pub fn step<'a>(doc: &'a Document, key: &str) -> Option<&'a Document> {
    match doc {
        Document::Object(fields) => fields.get(key),
        Document::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Reads the value at `path` as a pure left fold of key lookups.
///
/// # Errors
///
/// Returns [`PathError::NotFound`] when an intermediate step cannot be
/// descended; an absent final step is `Ok(None)`.
///
/// # Example
///
/// ```
/// use doc_path::{get, DotPath};
/// use doc_value::Document;
/// use serde_json::json;
///
/// let doc = Document::from(json!({"a": {"b": 1}}));
/// let found = get(&doc, &DotPath::parse("a.b").unwrap()).unwrap();
/// assert_eq!(found, Some(&Document::Int(1)));
///
/// let absent = get(&doc, &DotPath::parse("a.c").unwrap()).unwrap();
/// assert_eq!(absent, None);
///
/// assert!(get(&doc, &DotPath::parse("x.y.z").unwrap()).is_err());
/// ```
pub fn get<'a>(doc: &'a Document, path: &DotPath) -> Result<Option<&'a Document>, PathError> {
    let mut current = doc;
    let last = path.len() - 1;
    for (i, key) in path.keys().iter().enumerate() {
        match step(current, key) {
            Some(next) => current = next,
            None if i == last => return Ok(None),
            None => return Err(PathError::NotFound(path.format())),
        }
    }
    Ok(Some(current))
}

/// Produces the ordered chain of containers from the root to the addressed
/// field's immediate parent, inclusive of the root.
///
/// The chain has exactly `path.len()` entries; entry `i` is the container
/// that key `i` is looked up in. Entries are cheap clones — containers are
/// reference-counted.
///
/// # Errors
///
/// Returns [`PathError::NotFound`] when any intermediate key is absent or
/// lands on a non-container.
pub fn ancestors(doc: &Document, path: &DotPath) -> Result<Vec<Document>, PathError> {
    let mut chain = Vec::with_capacity(path.len());
    chain.push(doc.clone());
    let mut current = doc;
    for key in path.intermediates() {
        current = step(current, key).ok_or_else(|| PathError::NotFound(path.format()))?;
        chain.push(current.clone());
    }
    Ok(chain)
}

//! Dot-notation paths.
//!
//! A [`DotPath`] is a non-empty ordered sequence of keys, parsed from a
//! string by splitting on `.`. Each key addresses a map field or, when
//! numeric, a sequence index — array indices are accessed like map keys.
//!
//! # Example
//!
//! ```
//! use doc_path::DotPath;
//!
//! let path = DotPath::parse("user.tags.0").unwrap();
//! assert_eq!(path.keys(), ["user", "tags", "0"]);
//! assert_eq!(path.to_string(), "user.tags.0");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod resolve;

pub use resolve::{ancestors, get, step};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty dot-notation path")]
    Empty,
    #[error("path \"{0}\" does not exist")]
    NotFound(String),
}

/// A parsed dot-notation path: a non-empty ordered sequence of keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotPath {
    keys: Vec<String>,
}

impl DotPath {
    /// Parses a dot-notation string.
    ///
    /// Splitting is literal — there is no escaping, so keys themselves
    /// cannot contain `.`. Only the empty string is rejected.
    pub fn parse(path: &str) -> Result<DotPath, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(DotPath {
            keys: path.split('.').map(str::to_string).collect(),
        })
    }

    /// Builds a path from pre-split keys.
    pub fn from_keys(keys: Vec<String>) -> Result<DotPath, PathError> {
        if keys.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(DotPath { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of keys; always at least 1.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The final key — the field the path addresses.
    pub fn leaf(&self) -> &str {
        &self.keys[self.keys.len() - 1]
    }

    /// The non-leaf keys — every container that must be descended through.
    pub fn intermediates(&self) -> &[String] {
        &self.keys[..self.keys.len() - 1]
    }

    /// Re-joins the keys into the dot-notation string.
    pub fn format(&self) -> String {
        self.keys.join(".")
    }

    /// Returns `true` if `prefix` is a prefix of this path (equal counts).
    ///
    /// Storage adapters use this to narrow operator documents to a subtree
    /// before rewriting field names.
    pub fn starts_with(&self, prefix: &DotPath) -> bool {
        self.keys.len() >= prefix.keys.len()
            && self.keys[..prefix.keys.len()] == prefix.keys[..]
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for DotPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<DotPath, PathError> {
        DotPath::parse(s)
    }
}

//! Conversions between [`Document`] and `serde_json::Value`.
//!
//! JSON is the boundary format: operator documents arrive as JSON and
//! results leave as JSON. Object key order survives the round trip
//! (`serde_json` is built with `preserve_order`). JSON has no date kind, so
//! decoding never produces `Document::Date`; encoding renders dates as
//! RFC 3339 strings.

use indexmap::IndexMap;
use serde_json::Value;

use crate::Document;

impl From<Value> for Document {
    fn from(value: Value) -> Document {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Document::Int(i)
                } else {
                    // u64 beyond i64::MAX, or a float.
                    Document::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Document::String(s),
            Value::Array(items) => {
                Document::array(items.into_iter().map(Document::from).collect())
            }
            Value::Object(fields) => {
                let mut map = IndexMap::with_capacity(fields.len());
                for (key, val) in fields {
                    map.insert(key, Document::from(val));
                }
                Document::object(map)
            }
        }
    }
}

impl From<&Value> for Document {
    fn from(value: &Value) -> Document {
        Document::from(value.clone())
    }
}

impl Document {
    /// Encodes the value as a `serde_json::Value`.
    ///
    /// Dates become RFC 3339 strings; a non-finite float (which valid inputs
    /// cannot produce) degrades to `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Int(i) => Value::from(*i),
            Document::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::String(s) => Value::String(s.clone()),
            Document::Date(d) => Value::String(d.to_rfc3339()),
            Document::Array(items) => {
                Value::Array(items.iter().map(Document::to_json).collect())
            }
            Document::Object(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (key, val) in fields.iter() {
                    map.insert(key.clone(), val.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

//! Codecs for operator documents.
//!
//! The engine's typed operator model is decoded from, and re-encoded to,
//! the wire form callers actually send.

pub mod json;

//! Report export
//!
//! Writes a [`DecodeReport`](crate::decode::DecodeReport) out for other tools.
//! Currently supports a single JSON document.

pub mod json;

pub use json::JsonExporter;

//! Domain model for locid
//!
//! This module contains core domain types and errors that provide:
//! - Explicit target layout (pointer width, byte order) instead of host assumptions
//! - The decoded output triple
//! - Structured error handling split by severity (fatal vs per-entry)

pub mod errors;
pub mod types;

pub use types::{ByteOrder, PointerWidth, ResolvedLocation, TargetLayout};

pub use errors::{DecodeError, EntryError, ExportError, LookupError};

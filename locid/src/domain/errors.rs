//! Structured error types for locid
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! File- and region-level problems are [`DecodeError`] and abort a decode;
//! [`EntryError`] is reported per record and never aborts the others.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{path} is not an object file: {reason}")]
    NotAnObject { path: String, reason: String },

    #[error("Section {0} not found")]
    SectionNotFound(String),

    #[error(
        "Malformed {section} region: {size} bytes minus {padding} bytes of padding \
         is not a whole number of {record_size}-byte records"
    )]
    MalformedRegion { section: String, size: u64, padding: u64, record_size: usize },

    #[error("Failed to read section {section}: {reason}")]
    SectionRead { section: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("address 0x{address:x} is outside the string region [0x{base:x}, 0x{end:x})")]
    AddressOutOfRange { address: u64, base: u64, end: u64 },

    #[error("string at offset {offset} has no terminator before the end of the string region")]
    UnterminatedString { offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("anchor symbol not found (stripped binary?)")]
    AnchorNotFound,

    #[error("location id {id} points outside the record table")]
    OutOfTable { id: i32 },

    #[error("location id {id} is not on a {record_size}-byte record boundary")]
    Misaligned { id: i32, record_size: usize },

    #[error("location id {id} points at a sentinel record")]
    Sentinel { id: i32 },

    #[error(transparent)]
    Entry(#[from] EntryError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_not_found_display() {
        let err = DecodeError::SectionNotFound("loc_ids".to_string());
        assert_eq!(err.to_string(), "Section loc_ids not found");
    }

    #[test]
    fn test_malformed_region_display() {
        let err = DecodeError::MalformedRegion {
            section: "loc_ids".to_string(),
            size: 50,
            padding: 8,
            record_size: 24,
        };
        let msg = err.to_string();
        assert!(msg.contains("loc_ids"));
        assert!(msg.contains("24-byte"));
    }

    #[test]
    fn test_address_out_of_range_display() {
        let err = EntryError::AddressOutOfRange { address: 0x5000, base: 0x1000, end: 0x1040 };
        assert_eq!(
            err.to_string(),
            "address 0x5000 is outside the string region [0x1000, 0x1040)"
        );
    }

    #[test]
    fn test_entry_error_converts_to_lookup_error() {
        let err: LookupError = EntryError::UnterminatedString { offset: 7 }.into();
        assert!(err.to_string().contains("offset 7"));
    }
}

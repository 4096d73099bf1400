//! # Table Decoding
//!
//! Turns the record table of a binary back into call sites.
//!
//! ```text
//! TableRegion ──┐
//!               ├─► decode() ─► Entries ─► DecodeReport { locations, failures }
//! StringRegion ─┘                  │
//!                                  └─► LocationTable::resolve(id)
//! ```
//!
//! - **`decoder`**: record parsing and the lazy, restartable entry iterator
//! - **`report`**: splits an entry stream into successes and failures
//! - **`lookup`**: [`LocationTable`], which loads a binary once and answers
//!   single-id lookups against it

pub mod decoder;
pub mod lookup;
pub mod report;

pub use decoder::{decode, DecodedEntry, Entries, RawRecord};
pub use lookup::LocationTable;
pub use report::{id_for, DecodeReport, DecodedLocation, EntryFailure};

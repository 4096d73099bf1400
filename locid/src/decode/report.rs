//! Partial-failure summary of a decode
//!
//! Splits the decoder's entry stream into the locations that resolved and
//! the entries that didn't. Whether any failure is fatal is the caller's call.

use serde::{Serialize, Serializer};
use std::fmt::Display;

use crate::decode::DecodedEntry;
use crate::domain::{EntryError, ResolvedLocation};

/// A record that decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLocation {
    pub index: usize,
    /// Location id of the record, when the anchor address is known
    pub id: Option<i32>,
    #[serde(flatten)]
    pub location: ResolvedLocation,
}

/// A record that didn't
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub index: usize,
    pub id: Option<i32>,
    #[serde(serialize_with = "as_display")]
    pub error: EntryError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub locations: Vec<DecodedLocation>,
    pub failures: Vec<EntryFailure>,
}

impl DecodeReport {
    /// Drain an entry stream; `anchor` is the anchor record's address, if known
    pub fn collect(entries: impl IntoIterator<Item = DecodedEntry>, anchor: Option<u64>) -> Self {
        let mut report = Self::default();
        for entry in entries {
            let id = anchor.and_then(|anchor| id_for(entry.address, anchor));
            match entry.outcome {
                Ok(location) => {
                    report.locations.push(DecodedLocation { index: entry.index, id, location });
                }
                Err(error) => report.failures.push(EntryFailure { index: entry.index, id, error }),
            }
        }
        report
    }

    /// True when every non-sentinel record decoded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Signed distance from the anchor, if it fits a location id
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn id_for(address: u64, anchor: u64) -> Option<i32> {
    i32::try_from(address.wrapping_sub(anchor) as i64).ok()
}

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

//! Anchor-relative identifiers and the in-process resolver

use core::fmt;

use crate::{anchor_address, LocationRecord};

/// Compact call-site identifier
///
/// The signed byte offset of a [`LocationRecord`] from the anchor record.
/// Only meaningful for the exact binary that produced it; safe to log or
/// transmit as a plain `i32`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(i32);

impl LocationId {
    /// Identifier of a record placed in the `loc_ids` section
    ///
    /// Called by [`loc!`](crate::loc). The id is the exact distance from the
    /// anchor, so resolving it always lands back on `record`.
    ///
    /// # Panics
    /// If `record` is further than `i32` bytes from the anchor, which only
    /// happens for records outside the `loc_ids` section.
    #[doc(hidden)]
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn of(record: &'static LocationRecord) -> Self {
        let record_address = core::ptr::from_ref(record) as usize;
        let distance = record_address.wrapping_sub(anchor_address()) as isize;
        match i32::try_from(distance) {
            Ok(id) => Self(id),
            Err(_) => panic!("location record is {distance} bytes from the anchor"),
        }
    }

    /// Rebuild an identifier from its integer form, e.g. one parsed from a log
    ///
    /// # Safety
    /// `raw` must have been produced by [`LocationId::get`] in this same
    /// binary image. Resolving any other value reads arbitrary memory.
    #[must_use]
    pub const unsafe fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Integer form of the identifier
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// The record this identifier points at
    ///
    /// O(1) address arithmetic, no bounds check. Use
    /// `locid::decode::LocationTable::debug_validate` to check an identifier
    /// against the binary's section metadata.
    #[must_use]
    pub fn record(self) -> &'static LocationRecord {
        let address = anchor_address().wrapping_add_signed(self.0 as isize);
        // SAFETY: identifiers are only created by `of` (a live record) or by
        // the unsafe `from_raw`, whose caller vouches for the value. Records
        // are immutable statics.
        unsafe { &*(address as *const LocationRecord) }
    }

    /// Resolve to (function, file, line) without allocating
    #[must_use]
    pub fn resolve(self) -> Location {
        let record = self.record();
        Location { function: record.function(), file: record.file(), line: record.line() }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LocationId> for i32 {
    fn from(id: LocationId) -> Self {
        id.0
    }
}

/// A call site resolved in-process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub function: &'static str,
    pub file: &'static str,
    pub line: u32,
}

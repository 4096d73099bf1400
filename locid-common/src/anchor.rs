//! The process-wide zero point of every [`LocationId`](crate::LocationId)
//!
//! Exactly one anchor exists per linked binary: every crate that tags call
//! sites links this one static, so identifiers computed in one crate resolve
//! in any other.

use crate::LocationRecord;

/// Sentinel record all identifiers are measured from
///
/// Exported unmangled so the out-of-process decoder can find its link-time
/// address in the symbol table.
#[used]
#[no_mangle]
#[cfg_attr(target_vendor = "apple", link_section = "__DATA,loc_ids")]
#[cfg_attr(not(target_vendor = "apple"), link_section = "loc_ids")]
pub static LOC_ID_ANCHOR: LocationRecord = LocationRecord::ANCHOR;

/// Runtime address of [`LOC_ID_ANCHOR`]
#[inline]
#[must_use]
pub fn anchor_address() -> usize {
    core::ptr::addr_of!(LOC_ID_ANCHOR) as usize
}

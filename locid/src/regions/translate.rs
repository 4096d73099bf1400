//! Address translation: virtual address in a record → offset in the string buffer
//!
//! ```text
//!          base_address            address
//!               │                     │
//!               ▼                     ▼
//!  bytes ──────►┌──────────────────────────────────────┐
//!               │ ........ m a i n \0 ... a p p . c \0 │
//!               └──────────────────────────────────────┘
//!               offset = address - base_address, must be < len
//! ```
//!
//! Unlike the in-process path there is no locality guarantee here: every
//! address is checked before a byte is read.

use crate::domain::EntryError;
use crate::regions::StringRegion;

/// Byte offset of `address` inside the string region
///
/// # Errors
/// Returns [`EntryError::AddressOutOfRange`] if the address lies before the
/// region's base or at/after its end
pub fn translate(address: u64, strings: &StringRegion) -> Result<usize, EntryError> {
    let out_of_range = || EntryError::AddressOutOfRange {
        address,
        base: strings.base_address,
        end: strings.end_address(),
    };

    let offset = address.checked_sub(strings.base_address).ok_or_else(out_of_range)?;
    let offset = usize::try_from(offset).map_err(|_| out_of_range())?;
    if offset >= strings.bytes.len() {
        return Err(out_of_range());
    }
    Ok(offset)
}

/// The NUL-terminated string starting at `offset`, bounded by the region
///
/// Invalid UTF-8 is replaced rather than rejected: file paths are bytes.
///
/// # Errors
/// Returns [`EntryError::UnterminatedString`] if the region ends first
pub fn read_c_string(strings: &StringRegion, offset: usize) -> Result<String, EntryError> {
    let tail = strings.bytes.get(offset..).unwrap_or_default();
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(EntryError::UnterminatedString { offset })?;
    Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
}

/// Translate then read: the string a record field points at
///
/// # Errors
/// Returns whichever [`EntryError`] the two steps produce
pub fn resolve_string(address: u64, strings: &StringRegion) -> Result<String, EntryError> {
    read_c_string(strings, translate(address, strings)?)
}

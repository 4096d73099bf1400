//! Domain types providing compile-time safety and self-documentation
//!
//! The decoder never assumes the host's pointer width or byte order: every
//! field read goes through a [`TargetLayout`] describing the binary being
//! decoded.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Pointer width of the binary that produced the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PointerWidth {
    #[value(name = "32")]
    U32,
    #[value(name = "64")]
    U64,
}

impl PointerWidth {
    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            PointerWidth::U32 => 4,
            PointerWidth::U64 => 8,
        }
    }
}

/// Byte order of the binary that produced the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ByteOrder {
    Little,
    Big,
}

/// How records are laid out in the target binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetLayout {
    pub width: PointerWidth,
    pub byte_order: ByteOrder,
}

impl TargetLayout {
    /// Layout of the process running the decoder
    #[must_use]
    pub fn host() -> Self {
        let width =
            if std::mem::size_of::<usize>() == 8 { PointerWidth::U64 } else { PointerWidth::U32 };
        let byte_order =
            if cfg!(target_endian = "little") { ByteOrder::Little } else { ByteOrder::Big };
        Self { width, byte_order }
    }

    /// Size of one record: two pointers, `line`, `pad`
    #[must_use]
    pub fn record_size(self) -> usize {
        locid_common::record_size(self.width.bytes())
    }

    /// Read a pointer-width value at `offset`, `None` if it doesn't fit
    #[must_use]
    pub fn read_address(self, bytes: &[u8], offset: usize) -> Option<u64> {
        match self.width {
            PointerWidth::U32 => self.read_u32(bytes, offset).map(u64::from),
            PointerWidth::U64 => {
                let raw: [u8; 8] = bytes.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
                Some(match self.byte_order {
                    ByteOrder::Little => u64::from_le_bytes(raw),
                    ByteOrder::Big => u64::from_be_bytes(raw),
                })
            }
        }
    }

    #[must_use]
    pub fn read_u32(self, bytes: &[u8], offset: usize) -> Option<u32> {
        let raw: [u8; 4] = bytes.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self.byte_order {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        })
    }

    /// Store a pointer-width value at `offset`; returns false if it doesn't fit
    /// (including a value too wide for a 32-bit target)
    pub fn write_address(self, bytes: &mut [u8], offset: usize, value: u64) -> bool {
        let Some(end) = offset.checked_add(self.width.bytes()) else {
            return false;
        };
        let Some(slot) = bytes.get_mut(offset..end) else {
            return false;
        };
        match (self.width, self.byte_order) {
            (PointerWidth::U64, ByteOrder::Little) => slot.copy_from_slice(&value.to_le_bytes()),
            (PointerWidth::U64, ByteOrder::Big) => slot.copy_from_slice(&value.to_be_bytes()),
            (PointerWidth::U32, order) => {
                let Ok(value) = u32::try_from(value) else {
                    return false;
                };
                match order {
                    ByteOrder::Little => slot.copy_from_slice(&value.to_le_bytes()),
                    ByteOrder::Big => slot.copy_from_slice(&value.to_be_bytes()),
                }
            }
        }
        true
    }
}

impl fmt::Display for TargetLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.byte_order {
            ByteOrder::Little => "little-endian",
            ByteOrder::Big => "big-endian",
        };
        write!(f, "{}-bit {order}", self.width.bytes() * 8)
    }
}

/// A decoded call site
///
/// Produced by the table decoder or by an id lookup; never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedLocation {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl From<locid_common::Location> for ResolvedLocation {
    fn from(location: locid_common::Location) -> Self {
        Self {
            function: location.function.to_string(),
            file: location.file.to_string(),
            line: location.line,
        }
    }
}

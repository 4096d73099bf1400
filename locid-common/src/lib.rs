//! # Shared Record Layout (Producer ↔ Decoder)
//!
//! Defines the binary shape of a call-site record and the anchor-relative
//! identifier scheme shared by programs that tag their call sites and by the
//! out-of-process decoder in the `locid` crate. All types use `#[repr(C)]` so
//! the layout the compiler emits is the layout the decoder reads back.
//!
//! ## How an identifier is made
//!
//! ```text
//!   loc_ids section (one record per call site, fixed stride)
//! ┌────────────┬────────────┬────────────┬────────────┐
//! │  record A  │   ANCHOR   │  record B  │  record C  │
//! └────────────┴────────────┴────────────┴────────────┘
//!      -24           0           +24          +48      ← LocationId
//! ```
//!
//! Every [`loc!`] expansion places a [`LocationRecord`] in the `loc_ids`
//! section and returns its byte offset from [`LOC_ID_ANCHOR`]. Offsets are
//! signed: records the linker happens to place before the anchor get negative
//! identifiers.
//!
//! ## Key Types
//!
//! - [`LocationRecord`] - one (function, file, line) record
//! - [`LocationId`] - the 4-byte anchor-relative identifier
//! - [`Location`] - what the in-process resolver hands back

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_code)] // records hold raw pointers into static string data

use core::ffi::{c_char, CStr};

pub mod anchor;
mod id;
mod macros;

pub use anchor::{anchor_address, LOC_ID_ANCHOR};
pub use id::{Location, LocationId};

// ============================================================================
// Section and Symbol Names
// ============================================================================

/// Name of the link section holding the record table
pub const TABLE_SECTION: &str = "loc_ids";

/// Conventional name of the section holding the string literals records point at
pub const STRING_SECTION: &str = ".rodata";

/// Unmangled symbol name of the anchor record
pub const ANCHOR_SYMBOL: &str = "LOC_ID_ANCHOR";

/// Size in bytes of one record for a target with the given pointer width
///
/// Two pointers followed by `line` and `pad`. Used by the decoder when the
/// target binary's pointer width differs from the host's.
#[must_use]
pub const fn record_size(pointer_width: usize) -> usize {
    2 * pointer_width + 8
}

// ============================================================================
// Record Layout
// ============================================================================

/// One tagged call site
///
/// **Memory Layout**: `#[repr(C)]`, pointer, pointer, `u32`, `u32`.
/// 24 bytes on 64-bit targets, 16 bytes on 32-bit targets.
#[repr(C)]
#[derive(Debug)]
pub struct LocationRecord {
    /// Address of a NUL-terminated function name
    function_ref: *const c_char,

    /// Address of a NUL-terminated file path
    file_ref: *const c_char,

    /// Source line of the call site
    line: u32,

    /// Alignment filler, always zero
    pad: u32,
}

// SAFETY: records are immutable and only ever point at 'static string data.
unsafe impl Sync for LocationRecord {}

impl LocationRecord {
    /// Size of a record on the compilation target
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// The sentinel record: both references null, line zero
    pub const ANCHOR: Self = Self {
        function_ref: core::ptr::null(),
        file_ref: core::ptr::null(),
        line: 0,
        pad: 0,
    };

    /// Build a record from NUL-terminated static strings
    ///
    /// Evaluated in a `static` initializer by [`loc!`], so a missing
    /// terminator is a compile error rather than a runtime fault.
    #[must_use]
    pub const fn new(function: &'static str, file: &'static str, line: u32) -> Self {
        assert!(is_nul_terminated(function), "function name must end with a NUL byte");
        assert!(is_nul_terminated(file), "file path must end with a NUL byte");
        Self {
            function_ref: function.as_ptr().cast(),
            file_ref: file.as_ptr().cast(),
            line,
            pad: 0,
        }
    }

    /// Function name (empty for a sentinel)
    #[must_use]
    pub fn function(&self) -> &'static str {
        // SAFETY: `new` only accepts NUL-terminated 'static strings, `ANCHOR` holds null.
        unsafe { static_str(self.function_ref) }
    }

    /// File path (empty for a sentinel)
    #[must_use]
    pub fn file(&self) -> &'static str {
        // SAFETY: see `function`.
        unsafe { static_str(self.file_ref) }
    }

    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// True for the anchor and for zero fill between records
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.function_ref.is_null() && self.file_ref.is_null()
    }
}

const fn is_nul_terminated(s: &str) -> bool {
    let bytes = s.as_bytes();
    !bytes.is_empty() && bytes[bytes.len() - 1] == 0
}

/// # Safety
/// `ptr` must be null or point at a NUL-terminated string that lives for the
/// rest of the program.
unsafe fn static_str(ptr: *const c_char) -> &'static str {
    if ptr.is_null() {
        return "";
    }
    let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes();
    core::str::from_utf8(bytes).unwrap_or("")
}

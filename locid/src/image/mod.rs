//! # Binary Image Reader
//!
//! Opens an object file (ELF or Mach-O) without loading or executing it and
//! exposes what the decoder needs from it:
//!
//! - the ordered section table (name, declared address, size, alignment)
//! - each section's raw bytes, read through a chunked cursor
//! - symbol addresses (to find the anchor record)
//! - load-time relative relocations (to recover pointers a PIE leaves zeroed on disk)
//!
//! Mach-O is limited to images that store plain pointers. Chained fixups
//! encode each slot as a fixup chain entry rather than an address and are not
//! unpacked. Section names may be qualified as `SEGMENT,section` to pick
//! e.g. `__DATA_CONST,__const` over `__TEXT,__const`.
//!
//! **Libraries used**:
//! - `object`: format detection, section/symbol/relocation tables, and
//!   `ReadCache` for on-demand file access
//!
//! ## Reading a Section
//!
//! ```text
//! file ──► ReadCache ──► SectionCursor ──► [chunk][chunk][chunk] ──► Vec<u8>
//!                        (≤ 64 KiB per fragment, file order)
//! ```

pub mod reader;

pub use reader::{BinaryImage, SectionCursor, SectionHeader, READ_CHUNK};

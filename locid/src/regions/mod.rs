//! # Region Location and Address Translation
//!
//! The decoder works on two regions of the object file:
//!
//! - the **table region** (`loc_ids`): one fixed-size record per tagged call
//!   site, each holding two pointer-width string addresses and a line number
//! - the **string region** (`.rodata`): the NUL-terminated names those
//!   addresses point at
//!
//! Both are copied out of the file together with their declared virtual base
//! addresses. A record's string address is then turned into an offset in the
//! copied string bytes:
//!
//! ```text
//! offset = virtual_address - string_region.base_address
//! ```
//!
//! ## Module Structure
//!
//! - **`locator`**: single-pass, exact-name section lookup; region types and
//!   the entry-count rule
//! - **`relocations`**: writes load-time relative relocations back into the
//!   table so zeroed PIE slots decode
//! - **`translate`**: bounds-checked address → offset translation and string reads

pub mod locator;
pub mod relocations;
pub mod translate;

pub use locator::{locate, RegionNames, StringRegion, TableRegion};
pub use relocations::apply_relative_relocations;
pub use translate::{read_c_string, resolve_string, translate};

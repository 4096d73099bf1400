//! Relative relocation patching for position-independent binaries
//!
//! A PIE stores the pointers inside each record as "load base + addend"
//! relocations. Some linkers also write the addend into the section, others
//! (lld by default) leave the slot zeroed. Writing every relative addend back
//! into the table makes both cases decode the same way, with the link-time
//! addresses the string region is declared at.

use log::{info, warn};

use crate::domain::{DecodeError, TargetLayout};
use crate::image::BinaryImage;
use crate::regions::TableRegion;

/// Apply the image's relative relocations that land inside the table
///
/// Returns how many slots were written.
///
/// # Errors
/// Returns an error if the image's relocation tables can't be read
pub fn apply_relative_relocations(
    image: &BinaryImage,
    table: &mut TableRegion,
    layout: TargetLayout,
) -> Result<usize, DecodeError> {
    let range = table.base_address..table.base_address.saturating_add(table.size);
    let relocations = image.relative_relocations(range)?;
    let applied = patch_table(table, &relocations, layout);
    if applied > 0 {
        info!("Applied {applied} relative relocations to {}", table.name);
    }
    Ok(applied)
}

/// Write `(address, value)` pairs into the table's slots
pub fn patch_table(table: &mut TableRegion, relocations: &[(u64, u64)], layout: TargetLayout) -> usize {
    let mut applied = 0;
    for &(address, value) in relocations {
        let offset = address
            .checked_sub(table.base_address)
            .and_then(|offset| usize::try_from(offset).ok());
        match offset {
            Some(offset) if table.patch_address(offset, value, layout) => applied += 1,
            _ => warn!("Skipping relocation at 0x{address:x}: outside {}", table.name),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ByteOrder, PointerWidth};

    const LE64: TargetLayout =
        TargetLayout { width: PointerWidth::U64, byte_order: ByteOrder::Little };

    #[test]
    fn test_patch_fills_zeroed_slots() {
        let mut table = TableRegion::new("loc_ids", vec![0; 48], 0x1000, 8);
        let applied = patch_table(&mut table, &[(0x1018, 0x2010), (0x1020, 0x2020)], LE64);

        assert_eq!(applied, 2);
        assert_eq!(LE64.read_address(&table.bytes, 24), Some(0x2010));
        assert_eq!(LE64.read_address(&table.bytes, 32), Some(0x2020));
        assert_eq!(LE64.read_address(&table.bytes, 0), Some(0));
    }

    #[test]
    fn test_patch_skips_outside_slots() {
        let mut table = TableRegion::new("loc_ids", vec![0; 24], 0x1000, 8);
        let applied = patch_table(&mut table, &[(0x0ff8, 1), (0x1014, 2), (0x1010, 3)], LE64);

        assert_eq!(applied, 1);
        assert_eq!(LE64.read_address(&table.bytes, 16), Some(3));
    }
}

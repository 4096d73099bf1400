//! Table decoder: table region + string region → resolved call sites

use log::debug;

use crate::domain::{DecodeError, EntryError, ResolvedLocation, TargetLayout};
use crate::regions::{resolve_string, StringRegion, TableRegion};

/// One record as stored, before its string addresses are translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub function_ref: u64,
    pub file_ref: u64,
    pub line: u32,
}

impl RawRecord {
    /// Reinterpret one record's bytes, `None` if they are shorter than a record
    #[must_use]
    pub fn parse(bytes: &[u8], layout: TargetLayout) -> Option<Self> {
        if bytes.len() < layout.record_size() {
            return None;
        }
        let width = layout.width.bytes();
        Some(Self {
            function_ref: layout.read_address(bytes, 0)?,
            file_ref: layout.read_address(bytes, width)?,
            line: layout.read_u32(bytes, 2 * width)?,
        })
    }

    /// The anchor, or zero fill between records
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.function_ref == 0 && self.file_ref == 0
    }

    /// Translate both string addresses and pair them with the line
    ///
    /// # Errors
    /// Returns the first [`EntryError`] hit by the function then the file name
    pub fn resolve(&self, strings: &StringRegion) -> Result<ResolvedLocation, EntryError> {
        Ok(ResolvedLocation {
            function: resolve_string(self.function_ref, strings)?,
            file: resolve_string(self.file_ref, strings)?,
            line: self.line,
        })
    }
}

/// Outcome of decoding one table slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Position in the table
    pub index: usize,
    /// Virtual address of the record
    pub address: u64,
    pub outcome: Result<ResolvedLocation, EntryError>,
}

/// Lazy pass over a table's records
///
/// Each slot is decoded on demand and independently of the others, so a bad
/// record never hides the ones after it. Sentinel slots are skipped. Clone the
/// iterator (or call [`decode`] again) to start over.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    table: &'a TableRegion,
    strings: &'a StringRegion,
    layout: TargetLayout,
    next: usize,
    count: usize,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(
        table: &'a TableRegion,
        strings: &'a StringRegion,
        layout: TargetLayout,
        count: usize,
    ) -> Self {
        Self { table, strings, layout, next: 0, count }
    }

    /// Number of record slots in the table, sentinels included
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.count
    }
}

impl Iterator for Entries<'_> {
    type Item = DecodedEntry;

    fn next(&mut self) -> Option<DecodedEntry> {
        let record_size = self.layout.record_size();
        while self.next < self.count {
            let index = self.next;
            self.next += 1;

            let start = index * record_size;
            let raw = self
                .table
                .bytes
                .get(start..start + record_size)
                .and_then(|bytes| RawRecord::parse(bytes, self.layout))?;
            if raw.is_sentinel() {
                continue;
            }

            return Some(DecodedEntry {
                index,
                address: self.table.record_address(index, record_size),
                outcome: raw.resolve(self.strings),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.next))
    }
}

/// Decode every record of `table` against `strings`
///
/// # Errors
/// Returns [`DecodeError::MalformedRegion`] if the table isn't a whole number
/// of records once its padding is removed. Per-record problems are reported
/// through each [`DecodedEntry::outcome`] instead.
pub fn decode<'a>(
    table: &'a TableRegion,
    strings: &'a StringRegion,
    layout: TargetLayout,
) -> Result<Entries<'a>, DecodeError> {
    let count = table.entry_count(layout.record_size())?;
    debug!(
        "Decoding {}: {count} records of {} bytes ({layout})",
        table.name,
        layout.record_size()
    );
    Ok(Entries::new(table, strings, layout, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ByteOrder, PointerWidth};

    const LE64: TargetLayout =
        TargetLayout { width: PointerWidth::U64, byte_order: ByteOrder::Little };
    const BE32: TargetLayout = TargetLayout { width: PointerWidth::U32, byte_order: ByteOrder::Big };

    const STRING_BASE: u64 = 0x2000;

    fn record(layout: TargetLayout, function_ref: u64, file_ref: u64, line: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; layout.record_size()];
        let width = layout.width.bytes();
        assert!(layout.write_address(&mut bytes, 0, function_ref));
        assert!(layout.write_address(&mut bytes, width, file_ref));
        let line = match layout.byte_order {
            ByteOrder::Little => line.to_le_bytes(),
            ByteOrder::Big => line.to_be_bytes(),
        };
        bytes[2 * width..2 * width + 4].copy_from_slice(&line);
        bytes
    }

    /// `"...main\0..."` at offset 10 and `"app.c\0"` at offset 20
    fn strings() -> StringRegion {
        let mut bytes = vec![b'.'; 32];
        bytes[10..15].copy_from_slice(b"main\0");
        bytes[20..26].copy_from_slice(b"app.c\0");
        StringRegion::new(".rodata", bytes, STRING_BASE)
    }

    #[test]
    fn test_anchor_plus_one_entry() {
        let mut bytes = record(LE64, 0, 0, 0);
        bytes.extend(record(LE64, STRING_BASE + 10, STRING_BASE + 20, 42));
        let table = TableRegion::new("loc_ids", bytes, 0x1000, 8);
        let strings = strings();

        let entries: Vec<_> = decode(&table, &strings, LE64).unwrap().collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].address, 0x1018);
        assert_eq!(
            entries[0].outcome,
            Ok(ResolvedLocation { function: "main".into(), file: "app.c".into(), line: 42 })
        );
    }

    #[test]
    fn test_anchor_only_table_is_empty() {
        let table = TableRegion::new("loc_ids", record(LE64, 0, 0, 0), 0x1000, 8);
        let strings = strings();

        let entries = decode(&table, &strings, LE64).unwrap();
        assert_eq!(entries.record_count(), 1);
        assert_eq!(entries.count(), 0);
    }

    #[test]
    fn test_empty_table() {
        let table = TableRegion::new("loc_ids", Vec::new(), 0x1000, 8);
        let strings = strings();
        assert_eq!(decode(&table, &strings, LE64).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_table() {
        let table = TableRegion::new("loc_ids", vec![0; 48], 0x1000, 8).with_padding(8);
        let strings = strings();
        assert!(matches!(
            decode(&table, &strings, LE64),
            Err(DecodeError::MalformedRegion { record_size: 24, .. })
        ));
    }

    #[test]
    fn test_bad_entry_does_not_stop_others() {
        let mut bytes = record(LE64, STRING_BASE + 10, 0x9999_0000, 1);
        bytes.extend(record(LE64, STRING_BASE + 10, STRING_BASE + 20, 2));
        bytes.extend(record(LE64, STRING_BASE + 26, STRING_BASE + 20, 3));
        let table = TableRegion::new("loc_ids", bytes, 0x1000, 8);
        let strings = strings();

        let entries: Vec<_> = decode(&table, &strings, LE64).unwrap().collect();

        assert_eq!(entries.len(), 3);
        assert!(matches!(
            entries[0].outcome,
            Err(EntryError::AddressOutOfRange { address: 0x9999_0000, .. })
        ));
        assert_eq!(entries[1].outcome.as_ref().unwrap().line, 2);
        assert_eq!(entries[2].outcome, Err(EntryError::UnterminatedString { offset: 26 }));
    }

    #[test]
    fn test_decoding_is_restartable() {
        let mut bytes = record(LE64, STRING_BASE + 10, STRING_BASE + 20, 7);
        bytes.extend(record(LE64, 0, 0, 0));
        let table = TableRegion::new("loc_ids", bytes, 0x1000, 8);
        let strings = strings();

        let entries = decode(&table, &strings, LE64).unwrap();
        let first: Vec<_> = entries.clone().collect();
        let second: Vec<_> = entries.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_big_endian_32_bit_target() {
        let mut bytes = record(BE32, STRING_BASE + 20, STRING_BASE + 10, 0x0102_0304);
        bytes.extend(record(BE32, 0, 0, 0));
        let table = TableRegion::new("loc_ids", bytes, 0x1000, 4);
        let strings = strings();

        let entries: Vec<_> = decode(&table, &strings, BE32).unwrap().collect();
        let location = entries[0].outcome.as_ref().unwrap();
        assert_eq!(location.function, "app.c");
        assert_eq!(location.file, "main");
        assert_eq!(location.line, 0x0102_0304);
    }

    #[test]
    fn test_raw_record_too_short() {
        assert_eq!(RawRecord::parse(&[0; 20], LE64), None);
        assert_eq!(RawRecord::parse(&[0; 23], LE64), None);
        assert!(RawRecord::parse(&[0; 24], LE64).unwrap().is_sentinel());
        assert_eq!(RawRecord::parse(&[0; 12], BE32), None);
        assert!(RawRecord::parse(&[0; 16], BE32).is_some());
    }
}

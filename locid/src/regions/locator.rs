//! Region locator: find the record table and the string region by name

use log::{debug, info};

use crate::domain::{DecodeError, TargetLayout};
use crate::image::{BinaryImage, SectionHeader};

/// Exact section names of the two cooperating regions
///
/// A name of the form `SEGMENT,section` (e.g. `__TEXT,__cstring`) only
/// matches that section inside that Mach-O segment; a bare name matches the
/// section name in any segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionNames {
    pub table: String,
    pub strings: String,
}

fn matches_name(section: &SectionHeader, name: &str) -> bool {
    match name.split_once(',') {
        Some((segment, section_name)) => {
            section.segment.as_deref() == Some(segment) && section.name == section_name
        }
        None => section.name == name,
    }
}

/// The record table, copied out of the object file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Declared virtual base address
    pub base_address: u64,
    /// Declared size in bytes
    pub size: u64,
    /// Declared alignment in bytes
    pub align: u64,
    /// Trailing bytes that belong to no record; derived from `align` when `None`
    pub padding: Option<u64>,
}

impl TableRegion {
    /// A region whose declared size is its byte length
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, base_address: u64, align: u64) -> Self {
        let size = bytes.len() as u64;
        Self { name: name.into(), bytes, base_address, size, align, padding: None }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: u64) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Bytes at the end of the region reserved by the linker
    ///
    /// An explicit padding wins. Otherwise trailing bytes past the last whole
    /// record count as alignment fill only while they are smaller than the
    /// declared alignment; beyond that the declared alignment is used, which
    /// leaves a remainder and marks the region malformed.
    #[must_use]
    pub fn padding(&self, record_size: usize) -> u64 {
        if let Some(padding) = self.padding {
            return padding;
        }
        let slack = self.size % (record_size.max(1) as u64);
        if slack < self.align.max(1) {
            slack
        } else {
            self.align
        }
    }

    /// `(size - padding) / record_size`, which must divide exactly
    ///
    /// # Errors
    /// Returns [`DecodeError::MalformedRegion`] on a remainder or if the
    /// padding exceeds the size, and [`DecodeError::SectionRead`] if fewer
    /// bytes were read than the records need
    pub fn entry_count(&self, record_size: usize) -> Result<usize, DecodeError> {
        let padding = self.padding(record_size);
        let malformed = || DecodeError::MalformedRegion {
            section: self.name.clone(),
            size: self.size,
            padding,
            record_size,
        };

        let usable = self.size.checked_sub(padding).ok_or_else(malformed)?;
        let record = record_size as u64;
        if record == 0 || usable % record != 0 {
            return Err(malformed());
        }
        if (self.bytes.len() as u64) < usable {
            return Err(DecodeError::SectionRead {
                section: self.name.clone(),
                reason: format!("{} bytes of data for {usable} declared bytes", self.bytes.len()),
            });
        }
        usize::try_from(usable / record).map_err(|_| malformed())
    }

    /// Address of record `index`
    #[must_use]
    pub fn record_address(&self, index: usize, record_size: usize) -> u64 {
        self.base_address.wrapping_add((index as u64).wrapping_mul(record_size as u64))
    }

    /// Overwrite one pointer-width slot; false if it falls outside the bytes
    pub fn patch_address(&mut self, offset: usize, value: u64, layout: TargetLayout) -> bool {
        layout.write_address(&mut self.bytes, offset, value)
    }
}

/// The string literals table entries point into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRegion {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Declared virtual base address
    pub base_address: u64,
}

impl StringRegion {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, base_address: u64) -> Self {
        Self { name: name.into(), bytes, base_address }
    }

    /// One past the last address covered by the region
    #[must_use]
    pub fn end_address(&self) -> u64 {
        self.base_address.saturating_add(self.bytes.len() as u64)
    }
}

/// Find both regions in a single pass over the section table
///
/// Names match exactly, so sections that merely share a prefix with the
/// configured names are ignored. The first match of each name wins.
///
/// # Errors
/// Returns [`DecodeError::SectionNotFound`] naming whichever region is missing
pub fn locate(
    image: &BinaryImage,
    names: &RegionNames,
) -> Result<(TableRegion, StringRegion), DecodeError> {
    let (table, strings) = find_sections(image.sections()?, names);

    let table = table.ok_or_else(|| DecodeError::SectionNotFound(names.table.clone()))?;
    let strings = strings.ok_or_else(|| DecodeError::SectionNotFound(names.strings.clone()))?;

    info!(
        "Table section {} #{}: 0x{:x}, {} bytes, align {}",
        table.name, table.index, table.address, table.size, table.align
    );
    info!(
        "String section {} #{}: 0x{:x}, {} bytes",
        strings.name, strings.index, strings.address, strings.size
    );

    let table_region = TableRegion {
        bytes: image.read_section(&table)?,
        base_address: table.address,
        size: table.size,
        align: table.align,
        padding: None,
        name: table.name,
    };
    let string_region = StringRegion {
        bytes: image.read_section(&strings)?,
        base_address: strings.address,
        name: strings.name,
    };

    Ok((table_region, string_region))
}

fn find_sections(
    sections: Vec<SectionHeader>,
    names: &RegionNames,
) -> (Option<SectionHeader>, Option<SectionHeader>) {
    let mut table = None;
    let mut strings = None;

    for section in sections {
        if matches_name(&section, &names.table) {
            if table.is_none() {
                table = Some(section.clone());
            } else {
                debug!("Ignoring duplicate section {} #{}", section.name, section.index);
            }
        }
        if matches_name(&section, &names.strings) && strings.is_none() {
            strings = Some(section);
        }
    }

    (table, strings)
}

//! Out-of-process id lookup
//!
//! [`LocationTable`] keeps a binary's decoded regions around so individual
//! location ids reported by that binary can be turned back into call sites.

use log::{debug, info, warn};
use std::path::Path;

use crate::config::DecoderConfig;
use crate::decode::{id_for, DecodeReport, Entries, RawRecord};
use crate::domain::{DecodeError, LookupError, ResolvedLocation, TargetLayout};
use crate::image::BinaryImage;
use crate::regions::{apply_relative_relocations, locate, StringRegion, TableRegion};

/// The two regions of one binary, ready for decoding and id lookup
#[derive(Debug, Clone)]
pub struct LocationTable {
    table: TableRegion,
    strings: StringRegion,
    layout: TargetLayout,
    anchor: Option<u64>,
    count: usize,
}

impl LocationTable {
    /// Open `path` and prepare its record table
    ///
    /// The layout comes from the config when set, otherwise from the object
    /// header. A missing anchor symbol is not fatal: the table still decodes,
    /// but ids can't be computed or looked up.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the file isn't an object, either region
    /// is missing, or the table isn't a whole number of records
    pub fn load<P: AsRef<Path>>(path: P, config: &DecoderConfig) -> Result<Self, DecodeError> {
        let image = BinaryImage::open(path)?;
        let layout = match config.layout {
            Some(layout) => layout,
            None => image.native_layout()?,
        };
        info!("Decoding {} as {layout}", image.path().display());

        let (mut table, strings) = locate(&image, &config.region_names())?;
        if let Some(padding) = config.table_padding {
            table.padding = Some(padding);
        }
        apply_relative_relocations(&image, &mut table, layout)?;

        let anchor = image.symbol_address(&config.anchor_symbol)?;
        match anchor {
            Some(address) => debug!("Anchor {} at 0x{address:x}", config.anchor_symbol),
            None => warn!("Anchor symbol {} not found, ids unavailable", config.anchor_symbol),
        }

        Self::new(table, strings, layout, anchor)
    }

    /// Build from regions already in memory
    ///
    /// # Errors
    /// Returns [`DecodeError::MalformedRegion`] if the table isn't a whole
    /// number of records
    pub fn new(
        table: TableRegion,
        strings: StringRegion,
        layout: TargetLayout,
        anchor: Option<u64>,
    ) -> Result<Self, DecodeError> {
        let count = table.entry_count(layout.record_size())?;
        Ok(Self { table, strings, layout, anchor, count })
    }

    #[must_use]
    pub fn layout(&self) -> TargetLayout {
        self.layout
    }

    /// Address of the anchor record, if the symbol was found
    #[must_use]
    pub fn anchor(&self) -> Option<u64> {
        self.anchor
    }

    /// Record slots in the table, sentinels included
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every non-sentinel record, decoded lazily
    pub fn entries(&self) -> Entries<'_> {
        Entries::new(&self.table, &self.strings, self.layout, self.count)
    }

    /// Decode the whole table into a report
    #[must_use]
    pub fn report(&self) -> DecodeReport {
        DecodeReport::collect(self.entries(), self.anchor)
    }

    /// Location id of the record at `index`
    #[must_use]
    pub fn id_of(&self, index: usize) -> Option<i32> {
        let address = self.table.record_address(index, self.layout.record_size());
        id_for(address, self.anchor?)
    }

    /// Check that `id` names a record of this table and return its index
    ///
    /// # Errors
    /// Returns [`LookupError::AnchorNotFound`] without an anchor, and
    /// [`LookupError::OutOfTable`] or [`LookupError::Misaligned`] when
    /// `anchor + id` isn't the start of a record
    pub fn debug_validate(&self, id: i32) -> Result<usize, LookupError> {
        let anchor = self.anchor.ok_or(LookupError::AnchorNotFound)?;
        let record_size = self.layout.record_size();

        let offset = anchor
            .checked_add_signed(i64::from(id))
            .and_then(|address| address.checked_sub(self.table.base_address))
            .ok_or(LookupError::OutOfTable { id })?;
        let span = (self.count as u64) * (record_size as u64);
        if offset >= span {
            return Err(LookupError::OutOfTable { id });
        }
        if offset % record_size as u64 != 0 {
            return Err(LookupError::Misaligned { id, record_size });
        }
        usize::try_from(offset / record_size as u64).map_err(|_| LookupError::OutOfTable { id })
    }

    /// Decode the single record `id` names
    ///
    /// # Errors
    /// Returns any [`debug_validate`](Self::debug_validate) failure,
    /// [`LookupError::Sentinel`] for the anchor or zero fill, or the record's
    /// own [`EntryError`](crate::domain::EntryError)
    pub fn resolve(&self, id: i32) -> Result<ResolvedLocation, LookupError> {
        let index = self.debug_validate(id)?;
        let record_size = self.layout.record_size();
        let start = index * record_size;
        let raw = self
            .table
            .bytes
            .get(start..start + record_size)
            .and_then(|bytes| RawRecord::parse(bytes, self.layout))
            .ok_or(LookupError::OutOfTable { id })?;
        if raw.is_sentinel() {
            return Err(LookupError::Sentinel { id });
        }
        Ok(raw.resolve(&self.strings)?)
    }
}

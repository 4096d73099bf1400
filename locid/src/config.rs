//! Decoder configuration
//!
//! Everything the out-of-process decoder needs to know that the object file
//! itself doesn't say. Built from CLI arguments by the binary, or directly by
//! library callers.

use locid_common::{ANCHOR_SYMBOL, STRING_SECTION, TABLE_SECTION};

use crate::domain::TargetLayout;
use crate::regions::RegionNames;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Section holding the record table
    pub table_section: String,

    /// Section holding the strings records point at
    pub string_section: String,

    /// Symbol whose address is offset zero for every id
    pub anchor_symbol: String,

    /// Override the layout read from the object header
    pub layout: Option<TargetLayout>,

    /// Override the table's trailing padding (bytes)
    pub table_padding: Option<u64>,
}

impl DecoderConfig {
    #[must_use]
    pub fn region_names(&self) -> RegionNames {
        RegionNames { table: self.table_section.clone(), strings: self.string_section.clone() }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            table_section: TABLE_SECTION.to_string(),
            string_section: STRING_SECTION.to_string(),
            anchor_symbol: ANCHOR_SYMBOL.to_string(),
            layout: None,
            table_padding: None,
        }
    }
}

//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::DecoderConfig;
use crate::domain::{ByteOrder, PointerWidth, TargetLayout};

#[derive(Parser, Debug)]
#[command(
    name = "locid",
    about = "Decode the call-site location ids compiled into a binary",
    after_help = "\
EXAMPLES:
    locid ./my-app                           List every tagged call site
    locid ./my-app --brief                   One file:line::function() per line
    locid ./my-app -- -48 24                 Look up ids reported by my-app
    locid ./my-app --export locations.json   Save the decoded table as JSON"
)]
pub struct Args {
    /// Program binary to decode
    #[arg(value_name = "BINARY", required_unless_present = "program_binary")]
    pub binary: Option<PathBuf>,

    /// Program binary to decode (alternative to the positional argument)
    #[arg(short, long, value_name = "BINARY", conflicts_with = "binary")]
    pub program_binary: Option<PathBuf>,

    /// Location ids to look up instead of listing the whole table
    #[arg(last = true, value_name = "ID", allow_negative_numbers = true)]
    pub ids: Vec<i32>,

    /// Print one `file:line::function()` per entry
    #[arg(short, long)]
    pub brief: bool,

    /// Export the decoded table to a JSON file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Section holding the record table (`SEGMENT,section` for a Mach-O segment)
    #[arg(long, default_value = locid_common::TABLE_SECTION)]
    pub table_section: String,

    /// Section holding the strings records point at (`SEGMENT,section` allowed)
    #[arg(long, default_value = locid_common::STRING_SECTION)]
    pub string_section: String,

    /// Symbol marking id zero
    #[arg(long, default_value = locid_common::ANCHOR_SYMBOL)]
    pub anchor_symbol: String,

    /// Pointer width of the binary (read from its header if omitted)
    #[arg(long, value_enum, requires = "endian")]
    pub pointer_width: Option<PointerWidth>,

    /// Byte order of the binary (read from its header if omitted)
    #[arg(long, value_enum, requires = "pointer_width")]
    pub endian: Option<ByteOrder>,

    /// Trailing bytes of the table section that hold no record
    #[arg(long, value_name = "BYTES")]
    pub table_padding: Option<u64>,

    /// Exit with status 3 if any entry fails to decode
    #[arg(long)]
    pub strict: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// The binary named by either form of the argument
    #[must_use]
    pub fn binary_path(&self) -> Option<&PathBuf> {
        self.program_binary.as_ref().or(self.binary.as_ref())
    }

    #[must_use]
    pub fn decoder_config(&self) -> DecoderConfig {
        let layout = match (self.pointer_width, self.endian) {
            (Some(width), Some(byte_order)) => Some(TargetLayout { width, byte_order }),
            _ => None,
        };
        DecoderConfig {
            table_section: self.table_section.clone(),
            string_section: self.string_section.clone(),
            anchor_symbol: self.anchor_symbol.clone(),
            layout,
            table_padding: self.table_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_binary_defaults() {
        let args = Args::try_parse_from(["locid", "./app"]).unwrap();
        assert_eq!(args.binary_path(), Some(&PathBuf::from("./app")));
        assert_eq!(args.decoder_config(), DecoderConfig::default());
        assert!(args.ids.is_empty());
    }

    #[test]
    fn test_program_binary_flag() {
        let args = Args::try_parse_from(["locid", "-p", "./app", "--brief"]).unwrap();
        assert_eq!(args.binary_path(), Some(&PathBuf::from("./app")));
        assert!(args.brief);
    }

    #[test]
    fn test_negative_ids() {
        let args = Args::try_parse_from(["locid", "./app", "--", "-48", "24"]).unwrap();
        assert_eq!(args.ids, vec![-48, 24]);
    }

    #[test]
    fn test_layout_override() {
        let args = Args::try_parse_from([
            "locid",
            "./app",
            "--pointer-width",
            "32",
            "--endian",
            "big",
            "--table-padding",
            "8",
        ])
        .unwrap();
        let config = args.decoder_config();
        assert_eq!(
            config.layout,
            Some(TargetLayout { width: PointerWidth::U32, byte_order: ByteOrder::Big })
        );
        assert_eq!(config.table_padding, Some(8));
    }

    #[test]
    fn test_width_requires_endian() {
        assert!(Args::try_parse_from(["locid", "./app", "--pointer-width", "64"]).is_err());
    }

    #[test]
    fn test_binary_required() {
        assert!(Args::try_parse_from(["locid"]).is_err());
    }
}

//! Pre-flight checks for locid
//!
//! Validates the target binary before decoding starts.
//! Provides clear, actionable error messages when requirements aren't met.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::DecoderConfig;
use crate::domain::DecodeError;
use crate::image::BinaryImage;

/// Run all pre-flight checks before decoding
pub fn run_preflight_checks(binary: &Path, config: &DecoderConfig, quiet: bool) -> Result<()> {
    check_binary_exists(binary)?;
    if !quiet {
        if let Some(warning) = check_symbols(binary, config)? {
            eprintln!("warning: {warning}");
        }
    }
    Ok(())
}

/// Check if the target binary exists and is a regular file
fn check_binary_exists(binary: &Path) -> Result<()> {
    if !binary.exists() {
        bail!(
            "Binary not found: {}\n\n\
             Make sure the path is correct and the binary exists.",
            binary.display()
        );
    }
    if !binary.is_file() {
        bail!(
            "Not a file: {}\n\n\
             The program binary must be a compiled executable or library, not a directory.",
            binary.display()
        );
    }
    Ok(())
}

/// Warning to show when the anchor symbol can't be found, since ids then
/// can't be computed
fn check_symbols(binary: &Path, config: &DecoderConfig) -> Result<Option<String>> {
    let image = match BinaryImage::open(binary) {
        Ok(image) => image,
        // Not a valid object file, the decoder reports it
        Err(DecodeError::NotAnObject { .. }) => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read binary: {}", binary.display()))
        }
    };

    if image.symbol_address(&config.anchor_symbol)?.is_some() {
        return Ok(None);
    }
    if image.has_symbols()? {
        Ok(Some(format!("no {} symbol, location ids will not be shown", config.anchor_symbol)))
    } else {
        Ok(Some("binary stripped, location ids will not be shown".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object::write::{Object, Symbol, SymbolSection};
    use object::{
        Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
    };

    fn elf_with_symbol(name: Option<&str>) -> tempfile::NamedTempFile {
        let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
        let section = obj.add_section(Vec::new(), b"loc_ids".to_vec(), SectionKind::Data);
        obj.append_section_data(section, &[0; 24], 8);
        if let Some(name) = name {
            obj.add_symbol(Symbol {
                name: name.as_bytes().to_vec(),
                value: 0,
                size: 24,
                kind: SymbolKind::Data,
                scope: SymbolScope::Dynamic,
                weak: false,
                section: SymbolSection::Section(section),
                flags: SymbolFlags::None,
            });
        }
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), obj.write().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_binary_not_found() {
        let result = check_binary_exists(Path::new("/nonexistent/path/to/binary"));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Binary not found"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_binary_exists(dir.path()).unwrap_err().to_string();
        assert!(err.contains("Not a file"));
    }

    #[test]
    fn test_non_object_passes_through() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"plain text").unwrap();
        assert!(run_preflight_checks(file.path(), &DecoderConfig::default(), false).is_ok());
        assert_eq!(check_symbols(file.path(), &DecoderConfig::default()).unwrap(), None);
    }

    #[test]
    fn test_anchor_present_no_warning() {
        let file = elf_with_symbol(Some("LOC_ID_ANCHOR"));
        assert_eq!(check_symbols(file.path(), &DecoderConfig::default()).unwrap(), None);
    }

    #[test]
    fn test_underscore_prefixed_anchor_accepted() {
        let file = elf_with_symbol(Some("_LOC_ID_ANCHOR"));
        assert_eq!(check_symbols(file.path(), &DecoderConfig::default()).unwrap(), None);
    }

    #[test]
    fn test_missing_anchor_warns() {
        let file = elf_with_symbol(Some("other_symbol"));
        let warning = check_symbols(file.path(), &DecoderConfig::default()).unwrap().unwrap();
        assert!(warning.contains("no LOC_ID_ANCHOR symbol"));
    }

    #[test]
    fn test_no_symbols_warns() {
        let file = elf_with_symbol(None);
        let warning = check_symbols(file.path(), &DecoderConfig::default()).unwrap().unwrap();
        assert!(warning.contains("location ids will not be shown"));
    }
}

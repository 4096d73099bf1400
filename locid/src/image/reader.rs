use log::debug;
use object::read::ReadCache;
use object::{
    elf, Architecture, FileKind, Object, ObjectSection, ObjectSymbol, ReadRef, RelocationFlags,
};
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::domain::{ByteOrder, DecodeError, PointerWidth, TargetLayout};

/// Largest fragment a [`SectionCursor`] returns at once
pub const READ_CHUNK: u64 = 64 * 1024;

/// An object file opened for inspection
///
/// Backed by a read cache over the open file: only the headers and the
/// sections that are actually requested are ever read from disk.
pub struct BinaryImage {
    path: PathBuf,
    kind: FileKind,
    data: ReadCache<fs::File>,
}

/// One entry of the section table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub index: usize,
    pub name: String,
    /// Mach-O segment the section belongs to; `None` on ELF
    pub segment: Option<String>,
    /// Declared virtual base address
    pub address: u64,
    /// Declared size in bytes
    pub size: u64,
    /// Declared alignment in bytes
    pub align: u64,
    /// `(offset, size)` in the file, `None` for sections without file data
    pub file_range: Option<(u64, u64)>,
}

impl BinaryImage {
    /// Open an object file and validate its format header
    ///
    /// # Errors
    /// Returns [`DecodeError::NotAnObject`] if the file isn't an ELF or Mach-O
    /// object, or [`DecodeError::Io`] if it can't be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref().to_path_buf();
        let data = ReadCache::new(fs::File::open(&path)?);

        let kind = FileKind::parse(&data).map_err(|e| not_an_object(&path, e))?;
        if !matches!(kind, FileKind::Elf32 | FileKind::Elf64 | FileKind::MachO32 | FileKind::MachO64)
        {
            return Err(not_an_object(&path, format!("unsupported container {kind:?}")));
        }

        // Parse the headers once so a truncated section table fails here
        object::File::parse(&data).map_err(|e| not_an_object(&path, e))?;

        debug!("Opened {} as {kind:?}", path.display());
        Ok(Self { path, kind, data })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    fn object(&self) -> Result<object::File<'_, &ReadCache<fs::File>>, DecodeError> {
        object::File::parse(&self.data).map_err(|e| not_an_object(&self.path, e))
    }

    /// The section table, in file order
    ///
    /// # Errors
    /// Returns an error if the headers can no longer be parsed
    pub fn sections(&self) -> Result<Vec<SectionHeader>, DecodeError> {
        let file = self.object()?;
        Ok(file
            .sections()
            .map(|section| SectionHeader {
                index: section.index().0,
                name: section
                    .name_bytes()
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .unwrap_or_default(),
                segment: section.segment_name().ok().flatten().map(str::to_string),
                address: section.address(),
                size: section.size(),
                align: section.align(),
                file_range: section.file_range(),
            })
            .collect())
    }

    /// Cursor over a section's bytes in file order
    #[must_use]
    pub fn cursor<'a>(&'a self, header: &'a SectionHeader) -> SectionCursor<'a> {
        let (offset, remaining) = header.file_range.unwrap_or((0, 0));
        SectionCursor { data: &self.data, section: &header.name, offset, remaining }
    }

    /// Materialize a section into one owned buffer
    ///
    /// Drains [`cursor`](Self::cursor) and concatenates the fragments in order.
    ///
    /// # Errors
    /// Returns [`DecodeError::SectionRead`] if any fragment can't be read
    pub fn read_section(&self, header: &SectionHeader) -> Result<Vec<u8>, DecodeError> {
        let capacity = header.file_range.map_or(0, |(_, size)| size);
        let mut buffer = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
        let mut chunks = 0usize;
        for chunk in self.cursor(header) {
            buffer.extend_from_slice(chunk?);
            chunks += 1;
        }
        debug!("Read section {} ({} bytes, {chunks} chunks)", header.name, buffer.len());
        Ok(buffer)
    }

    /// Pointer width and byte order declared by the object header
    ///
    /// # Errors
    /// Returns an error if the headers can no longer be parsed
    pub fn native_layout(&self) -> Result<TargetLayout, DecodeError> {
        let file = self.object()?;
        Ok(TargetLayout {
            width: if file.is_64() { PointerWidth::U64 } else { PointerWidth::U32 },
            byte_order: if file.is_little_endian() { ByteOrder::Little } else { ByteOrder::Big },
        })
    }

    /// Link-time address of a defined symbol
    ///
    /// Searches the static then the dynamic symbol table. A single leading
    /// underscore is ignored so Mach-O symbol names match.
    ///
    /// # Errors
    /// Returns an error if the headers can no longer be parsed
    pub fn symbol_address(&self, name: &str) -> Result<Option<u64>, DecodeError> {
        let file = self.object()?;
        let found = file.symbols().chain(file.dynamic_symbols()).find(|symbol| {
            symbol.is_definition()
                && symbol.name().is_ok_and(|n| n == name || n.strip_prefix('_') == Some(name))
        });
        Ok(found.map(|symbol| symbol.address()))
    }

    /// True if the static or dynamic symbol table has any entries
    ///
    /// # Errors
    /// Returns an error if the headers can no longer be parsed
    pub fn has_symbols(&self) -> Result<bool, DecodeError> {
        let file = self.object()?;
        Ok(file.symbols().next().is_some() || file.dynamic_symbols().next().is_some())
    }

    /// Load-time relative relocations whose target lies in `range`
    ///
    /// Returns `(address, value)` pairs. Only relocations with an explicit
    /// addend are returned: implicit addends already sit in the section data.
    ///
    /// # Errors
    /// Returns an error if the headers can no longer be parsed
    #[allow(clippy::cast_sign_loss)]
    pub fn relative_relocations(&self, range: Range<u64>) -> Result<Vec<(u64, u64)>, DecodeError> {
        let file = self.object()?;
        let Some(relative) = relative_relocation_type(file.architecture()) else {
            return Ok(Vec::new());
        };
        let Some(relocations) = file.dynamic_relocations() else {
            return Ok(Vec::new());
        };

        Ok(relocations
            .filter(|(address, _)| range.contains(address))
            .filter_map(|(address, relocation)| match relocation.flags() {
                RelocationFlags::Elf { r_type }
                    if r_type == relative && !relocation.has_implicit_addend() =>
                {
                    Some((address, relocation.addend() as u64))
                }
                _ => None,
            })
            .collect())
    }
}

impl fmt::Debug for BinaryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryImage").field("path", &self.path).field("kind", &self.kind).finish()
    }
}

/// ELF relocation type meaning "load base + addend" on this architecture
fn relative_relocation_type(architecture: Architecture) -> Option<u32> {
    match architecture {
        Architecture::X86_64 | Architecture::X86_64_X32 => Some(elf::R_X86_64_RELATIVE),
        Architecture::I386 => Some(elf::R_386_RELATIVE),
        Architecture::Aarch64 => Some(elf::R_AARCH64_RELATIVE),
        Architecture::Arm => Some(elf::R_ARM_RELATIVE),
        Architecture::Riscv32 | Architecture::Riscv64 => Some(elf::R_RISCV_RELATIVE),
        _ => None,
    }
}

fn not_an_object(path: &Path, reason: impl fmt::Display) -> DecodeError {
    DecodeError::NotAnObject { path: path.display().to_string(), reason: reason.to_string() }
}

/// Reads one section's file range in fragments of at most [`READ_CHUNK`] bytes
pub struct SectionCursor<'a> {
    data: &'a ReadCache<fs::File>,
    section: &'a str,
    offset: u64,
    remaining: u64,
}

impl<'a> Iterator for SectionCursor<'a> {
    type Item = Result<&'a [u8], DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let len = self.remaining.min(READ_CHUNK);
        match self.data.read_bytes_at(self.offset, len) {
            Ok(chunk) => {
                self.offset += len;
                self.remaining -= len;
                Some(Ok(chunk))
            }
            Err(()) => {
                // Stop after the first failure
                self.remaining = 0;
                Some(Err(DecodeError::SectionRead {
                    section: self.section.to_string(),
                    reason: format!("file data at offset {} is truncated", self.offset),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_rejects_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "definitely not an object file").unwrap();

        let err = BinaryImage::open(file.path()).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }), "got {err:?}");
    }

    #[test]
    fn test_open_missing_file() {
        let err = BinaryImage::open("/nonexistent/path/to/binary").unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn test_relative_relocation_types() {
        assert_eq!(relative_relocation_type(Architecture::X86_64), Some(8));
        assert_eq!(relative_relocation_type(Architecture::Aarch64), Some(1027));
        assert_eq!(relative_relocation_type(Architecture::Wasm32), None);
    }
}

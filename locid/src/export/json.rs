use serde::Serialize;
use std::io::Write;

use crate::decode::{DecodeReport, DecodedLocation, EntryFailure};
use crate::domain::{ExportError, TargetLayout};

/// JSON document describing one decoded binary
///
/// ```json
/// {
///   "binary": "./app",
///   "layout": "64-bit little-endian",
///   "anchor": 4120,
///   "locations": [{ "index": 1, "id": 24, "function": "main", "file": "app.c", "line": 42 }],
///   "failures": []
/// }
/// ```
pub struct JsonExporter {
    binary: String,
    layout: TargetLayout,
    anchor: Option<u64>,
    report: DecodeReport,
}

#[derive(Serialize)]
struct Document<'a> {
    binary: &'a str,
    layout: String,
    anchor: Option<u64>,
    locations: &'a [DecodedLocation],
    failures: &'a [EntryFailure],
}

impl JsonExporter {
    #[must_use]
    pub fn new(
        binary: impl Into<String>,
        layout: TargetLayout,
        anchor: Option<u64>,
        report: DecodeReport,
    ) -> Self {
        Self { binary: binary.into(), layout, anchor, report }
    }

    /// Serialize the report to `writer`
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        let document = Document {
            binary: &self.binary,
            layout: self.layout.to_string(),
            anchor: self.anchor,
            locations: &self.report.locations,
            failures: &self.report.failures,
        };
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ByteOrder, EntryError, PointerWidth, ResolvedLocation};

    #[test]
    fn test_export_document_shape() {
        let report = DecodeReport {
            locations: vec![DecodedLocation {
                index: 1,
                id: Some(24),
                location: ResolvedLocation {
                    function: "main".into(),
                    file: "app.c".into(),
                    line: 42,
                },
            }],
            failures: vec![EntryFailure {
                index: 2,
                id: Some(48),
                error: EntryError::UnterminatedString { offset: 9 },
            }],
        };
        let layout = TargetLayout { width: PointerWidth::U64, byte_order: ByteOrder::Little };
        let exporter = JsonExporter::new("./app", layout, Some(0x1000), report);

        let mut buffer = Vec::new();
        exporter.export(&mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(parsed["binary"], "./app");
        assert_eq!(parsed["layout"], "64-bit little-endian");
        assert_eq!(parsed["anchor"], 0x1000);
        assert_eq!(parsed["locations"][0]["function"], "main");
        assert_eq!(parsed["locations"][0]["line"], 42);
        assert_eq!(parsed["locations"][0]["id"], 24);
        assert_eq!(parsed["failures"][0]["index"], 2);
        assert!(parsed["failures"][0]["error"].is_string());
    }
}

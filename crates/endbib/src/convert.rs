//! Whole-document conversion: parse, map, emit.

use crate::mapping::map_record;
use endbib_core::{
    ConversionResult, ConversionWarning, ConvertOptions, MappedEntry, ParseError, WarningReason,
};
use endbib_write_bibtex::Emitter;
use std::path::Path;

/// Convert an EndNote XML document to BibTeX entries.
///
/// Fails only when the document itself cannot be read. Problems with single
/// records become warnings; the output holds one entry per record that maps.
pub fn convert(input: &[u8], options: &ConvertOptions) -> Result<ConversionResult, ParseError> {
    let records = endbib_read_endnotexml::parse(input)?;
    tracing::debug!(records = records.len(), "parsed EndNote XML");

    let mut conversion = Conversion::new();
    for (offset, record) in records.iter().enumerate() {
        let index = offset + 1;
        let mut warnings = Vec::new();
        let entry = map_record(record, index, options, &mut warnings);
        conversion.warnings.append(&mut warnings);
        if let Some(entry) = entry {
            conversion.push_entry(&entry, index);
        }
    }

    let result = conversion.finish();
    tracing::info!(
        records = records.len(),
        entries = result.entries.len(),
        warnings = result.warnings.len(),
        "converted EndNote XML to BibTeX"
    );
    Ok(result)
}

/// Read and convert an EndNote XML file.
pub fn convert_file(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionResult, ParseError> {
    let path = path.as_ref();
    let input = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = input.len(), "read input file");
    convert(&input, options)
}

struct Conversion {
    emitter: Emitter,
    entries: Vec<String>,
    warnings: Vec<ConversionWarning>,
}

impl Conversion {
    fn new() -> Self {
        Self {
            emitter: Emitter::new(),
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Serialize one entry, or record why it was skipped.
    fn push_entry(&mut self, entry: &MappedEntry, index: usize) {
        match self.emitter.emit(entry, index) {
            Ok(bibtex) => self.entries.push(bibtex),
            Err(err) => {
                tracing::warn!(record = index, error = %err, "skipping record");
                let warning = ConversionWarning::new(
                    index,
                    entry.entry_type.as_str(),
                    WarningReason::RecordSkipped,
                )
                .with_detail(err.to_string());
                self.warnings.push(warning);
            }
        }
    }

    fn finish(self) -> ConversionResult {
        ConversionResult::with_warnings(self.entries, self.warnings)
    }
}

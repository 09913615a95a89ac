//! Endbib - EndNote XML to BibTeX conversion
//!
//! Endbib reads a reference-manager export in EndNote XML and writes one
//! BibTeX entry per record, with:
//! - A static table mapping EndNote reference types to BibTeX entry types
//! - Unique citation keys (`smith2020`, `smith2020a`, ...)
//! - Optional LaTeX markup for bold, italic and other styled text
//! - Warnings for unmapped types, missing required fields and skipped records
//!
//! # Quick Start
//!
//! ```rust
//! use endbib::prelude::*;
//!
//! let xml = br#"<xml><records><record>
//!   <ref-type name="Journal Article">17</ref-type>
//!   <contributors><authors><author>Smith, John</author></authors></contributors>
//!   <titles>
//!     <title>A Great Paper</title>
//!     <secondary-title>Nature</secondary-title>
//!   </titles>
//!   <dates><year>2020</year></dates>
//! </record></records></xml>"#;
//!
//! let result = endbib::convert(xml, &ConvertOptions::default()).unwrap();
//! assert_eq!(result.entries.len(), 1);
//! assert!(result.entries[0].starts_with("@article{smith2020,"));
//! assert!(!result.has_warnings());
//! ```
//!
//! # Architecture
//!
//! A conversion runs in three stages:
//! - the EndNote XML reader turns each `<record>` into a `RawRecord`
//! - [`mapping`] turns a `RawRecord` into a `MappedEntry`
//! - the BibTeX writer serializes the entry and assigns its key
//!
//! A malformed document fails the whole conversion with a `ParseError`;
//! everything else is reported per record.
//!
//! # Features
//!
//! - `serde` - Serialize results and warnings, deserialize `ConvertOptions`

pub use endbib_core::*;

mod convert;
pub mod mapping;

pub use convert::{convert, convert_file};

/// EndNote XML reading.
pub mod endnotexml {
    pub use endbib_read_endnotexml::{MAX_DEPTH, Records, parse, records};
}

/// BibTeX writing.
pub mod bibtex {
    pub use endbib_write_bibtex::{CiteKeys, Emitter, base_key, escape_bibtex, render_value};
}

/// Common imports for typical usage.
pub mod prelude {
    pub use crate::{
        ConversionResult, ConversionWarning, ConvertOptions, ParseError, WarningReason,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map_emit_by_hand() {
        let xml = b"<xml><records><record>\
            <ref-type name=\"Book\">6</ref-type>\
            <titles><title>Rust</title></titles>\
            </record></records></xml>";

        let records = endnotexml::parse(xml).unwrap();
        let mut warnings = Vec::new();
        let entry =
            mapping::map_record(&records[0], 1, &ConvertOptions::default(), &mut warnings)
                .unwrap();
        assert_eq!(entry.entry_type, EntryType::Book);
        assert_eq!(warnings.len(), 3);

        let bibtex = bibtex::Emitter::new().emit(&entry, 1).unwrap();
        assert_eq!(bibtex, "@book{entry1,\n  title = {Rust},\n}");
    }
}

//! BibTeX writer for endbib.
//!
//! Serializes [`MappedEntry`]s as BibTeX source. Literal field text is
//! escaped; markup produced from EndNote styles is written as-is.
//!
//! ```
//! use endbib_core::{EntryType, MappedEntry};
//! use endbib_write_bibtex::Emitter;
//!
//! let entry = MappedEntry::new(EntryType::Article)
//!     .with_field("author", "Smith, John")
//!     .with_field("title", "100% Pure & Simple")
//!     .with_field("year", "2020");
//! let mut emitter = Emitter::new();
//! let bibtex = emitter.emit(&entry, 1).unwrap();
//! assert!(bibtex.starts_with("@article{smith2020,"));
//! assert!(bibtex.contains("title = {100\\% Pure \\& Simple},"));
//! ```

mod keys;

pub use keys::{CiteKeys, base_key};

use endbib_core::{EmitError, FieldText, MappedEntry, Segment};

/// Serializes the entries of one document, keeping their keys unique.
#[derive(Debug, Default)]
pub struct Emitter {
    keys: CiteKeys,
}

impl Emitter {
    /// Create an emitter for a new document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `entry`, the record at 1-based position `index`.
    ///
    /// The citation key is only reserved once the entry renders, so a failed
    /// entry does not push later keys onto a suffix.
    pub fn emit(&mut self, entry: &MappedEntry, index: usize) -> Result<String, EmitError> {
        let mut body = String::new();
        for (name, value) in entry.fields() {
            emit_field(name, value, &mut body)?;
        }

        let key = self.keys.assign(entry, index);
        tracing::trace!(key = %key, fields = entry.len(), "emitted BibTeX entry");

        let mut output = String::with_capacity(body.len() + key.len() + 16);
        output.push('@');
        output.push_str(entry.entry_type.as_str());
        output.push('{');
        output.push_str(&key);
        output.push_str(",\n");
        output.push_str(&body);
        output.push('}');
        Ok(output)
    }
}

/// Emit a single BibTeX field.
fn emit_field(name: &str, value: &FieldText, out: &mut String) -> Result<(), EmitError> {
    if !is_field_name(name) {
        return Err(EmitError::InvalidFieldName(name.to_string()));
    }
    let rendered = render_value(value);
    if !braces_balanced(&rendered) {
        return Err(EmitError::UnbalancedBraces(name.to_string()));
    }
    out.push_str("  ");
    out.push_str(name);
    out.push_str(" = {");
    out.push_str(&rendered);
    out.push_str("},\n");
    Ok(())
}

/// Render field text as brace-delimited BibTeX content.
pub fn render_value(value: &FieldText) -> String {
    let mut out = String::new();
    for segment in value.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(&escape_bibtex(text)),
            Segment::Markup(markup) => out.push_str(markup),
        }
    }
    out
}

/// Escape special BibTeX characters.
pub fn escape_bibtex(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                result.push('\\');
                result.push(c);
            }
            '\\' => result.push_str("\\textbackslash{}"),
            _ => result.push(c),
        }
    }
    result
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Check that unescaped braces pair up.
fn braces_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use endbib_core::EntryType;

    fn make_entry(entry_type: EntryType, fields: Vec<(&str, &str)>) -> MappedEntry {
        let mut entry = MappedEntry::new(entry_type);
        for (name, value) in fields {
            entry.set(name, value);
        }
        entry
    }

    #[test]
    fn test_emit_article() {
        let entry = make_entry(
            EntryType::Article,
            vec![
                ("author", "Smith, John"),
                ("title", "A Great Paper"),
                ("journal", "Nature"),
                ("year", "2024"),
            ],
        );

        let output = Emitter::new().emit(&entry, 1).unwrap();
        assert_eq!(
            output,
            "@article{smith2024,\n  author = {Smith, John},\n  title = {A Great Paper},\n  journal = {Nature},\n  year = {2024},\n}"
        );
    }

    #[test]
    fn test_emit_without_fields() {
        let entry = MappedEntry::new(EntryType::Misc);
        let output = Emitter::new().emit(&entry, 3).unwrap();
        assert_eq!(output, "@misc{entry3,\n}");
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(
            escape_bibtex("100% Pure & Simple: A $10 Solution"),
            "100\\% Pure \\& Simple: A \\$10 Solution"
        );
        assert_eq!(escape_bibtex("{a}_#"), "\\{a\\}\\_\\#");
        assert_eq!(escape_bibtex("C:\\dir"), "C:\\textbackslash{}dir");
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let mut title = FieldText::new();
        title.push_markup("\\emph{");
        title.push_literal("R&D");
        title.push_markup("}");
        assert_eq!(render_value(&title), "\\emph{R\\&D}");
    }

    #[test]
    fn test_escaped_values_stay_balanced() {
        for raw in ["{", "}", "}{", "a\\", "\\{", "{{}"] {
            assert!(braces_balanced(&escape_bibtex(raw)), "{raw:?}");
        }
        assert!(!braces_balanced("}{"));
        assert!(!braces_balanced("{"));
    }

    #[test]
    fn test_unbalanced_markup_is_rejected() {
        let mut title = FieldText::new();
        title.push_markup("\\textbf{");
        title.push_literal("open");
        let entry = MappedEntry::new(EntryType::Misc).with_field("title", title);
        assert!(matches!(
            Emitter::new().emit(&entry, 1),
            Err(EmitError::UnbalancedBraces(field)) if field == "title"
        ));
    }

    #[test]
    fn test_invalid_field_name_is_rejected() {
        let entry = MappedEntry::new(EntryType::Misc).with_field("bad name", "x");
        assert!(matches!(
            Emitter::new().emit(&entry, 1),
            Err(EmitError::InvalidFieldName(_))
        ));
    }

    #[test]
    fn test_failed_entry_does_not_reserve_key() {
        let mut emitter = Emitter::new();
        let broken = MappedEntry::new(EntryType::Article)
            .with_field("author", "Smith, John")
            .with_field("year", "2020")
            .with_field("Title", "x");
        assert!(emitter.emit(&broken, 1).is_err());

        let fine = MappedEntry::new(EntryType::Article)
            .with_field("author", "Smith, John")
            .with_field("year", "2020");
        assert!(emitter.emit(&fine, 2).unwrap().starts_with("@article{smith2020,"));
    }
}

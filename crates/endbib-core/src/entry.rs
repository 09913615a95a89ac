//! BibTeX entries produced by the field mapper.

use crate::FieldText;
use std::fmt;

/// BibTeX entry types the converter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntryType {
    Article,
    Book,
    InBook,
    InCollection,
    InProceedings,
    Proceedings,
    PhdThesis,
    MastersThesis,
    TechReport,
    Online,
    Patent,
    Unpublished,
    Misc,
}

impl EntryType {
    /// All entry types.
    pub const ALL: [EntryType; 13] = [
        EntryType::Article,
        EntryType::Book,
        EntryType::InBook,
        EntryType::InCollection,
        EntryType::InProceedings,
        EntryType::Proceedings,
        EntryType::PhdThesis,
        EntryType::MastersThesis,
        EntryType::TechReport,
        EntryType::Online,
        EntryType::Patent,
        EntryType::Unpublished,
        EntryType::Misc,
    ];

    /// The name written after `@`.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Article => "article",
            EntryType::Book => "book",
            EntryType::InBook => "inbook",
            EntryType::InCollection => "incollection",
            EntryType::InProceedings => "inproceedings",
            EntryType::Proceedings => "proceedings",
            EntryType::PhdThesis => "phdthesis",
            EntryType::MastersThesis => "mastersthesis",
            EntryType::TechReport => "techreport",
            EntryType::Online => "online",
            EntryType::Patent => "patent",
            EntryType::Unpublished => "unpublished",
            EntryType::Misc => "misc",
        }
    }

    /// Look up an entry type by its BibTeX name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        EntryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record mapped onto a BibTeX entry type and fields.
///
/// Fields keep insertion order so output is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedEntry {
    pub entry_type: EntryType,
    fields: Vec<(String, FieldText)>,
}

impl MappedEntry {
    /// Create an entry with no fields.
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            fields: Vec::new(),
        }
    }

    /// Add a field, returning the entry.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldText>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field. A new field goes last; an existing one keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldText>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field.
    pub fn get(&self, name: &str) -> Option<&FieldText> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Check if a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in emission order.
    pub fn fields(&self) -> &[(String, FieldText)] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the entry has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_names() {
        assert_eq!(EntryType::InProceedings.as_str(), "inproceedings");
        assert_eq!(EntryType::from_name("PhdThesis"), Some(EntryType::PhdThesis));
        assert_eq!(EntryType::from_name("conference"), None);
        for t in EntryType::ALL {
            assert_eq!(EntryType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_field_order_is_insertion_order() {
        let mut entry = MappedEntry::new(EntryType::Article)
            .with_field("author", "Smith, John")
            .with_field("title", "First")
            .with_field("year", "2020");
        entry.set("title", "Second");

        let names: Vec<&str> = entry.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["author", "title", "year"]);
        assert_eq!(entry.get("title").map(FieldText::plain).as_deref(), Some("Second"));
    }
}

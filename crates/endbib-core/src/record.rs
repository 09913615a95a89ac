//! Raw EndNote records as read from the XML export.

use crate::{FieldText, StyleMode, StyledText};
use std::collections::HashMap;

/// The value of one EndNote field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text without any style markup.
    Plain(String),
    /// Text carrying EndNote style spans.
    Styled(StyledText),
}

impl FieldValue {
    /// Extract the value as field text, keeping or dropping styles per `mode`.
    pub fn extract(&self, mode: StyleMode) -> FieldText {
        match self {
            FieldValue::Plain(text) => FieldText::literal(text.as_str()),
            FieldValue::Styled(styled) => styled.extract(mode),
        }
    }

    /// Concatenated text with all styling discarded.
    pub fn plain_text(&self) -> String {
        match self {
            FieldValue::Plain(text) => text.clone(),
            FieldValue::Styled(styled) => styled.plain_text(),
        }
    }

    /// Check whether the value holds no visible text.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Plain(text) => text.trim().is_empty(),
            FieldValue::Styled(styled) => styled.plain_text().trim().is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Plain(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Plain(s)
    }
}

impl From<StyledText> for FieldValue {
    fn from(styled: StyledText) -> Self {
        FieldValue::Styled(styled)
    }
}

/// One `<record>` of an EndNote export, keyed by EndNote field name
/// (`title`, `secondary-title`, `authors`, `year`, `ref-type`, ...).
///
/// Fields the record does not carry are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, FieldValue>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, returning the record.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names present in this record, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

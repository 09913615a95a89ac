//! Conversion results and the warnings collected along the way.

use std::fmt;

/// Result of converting one document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionResult {
    /// Serialized BibTeX entries, in document order.
    pub entries: Vec<String>,
    /// Warnings about records or fields that could not be carried over.
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionResult {
    /// Create a result with no warnings.
    pub fn ok(entries: Vec<String>) -> Self {
        Self {
            entries,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(entries: Vec<String>, warnings: Vec<ConversionWarning>) -> Self {
        Self { entries, warnings }
    }

    /// Add a warning.
    pub fn warn(mut self, warning: ConversionWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count warnings with the given reason.
    pub fn count(&self, reason: WarningReason) -> usize {
        self.warnings.iter().filter(|w| w.reason == reason).count()
    }

    /// All entries as one BibTeX document: entries separated by a blank line,
    /// ending with a newline.
    pub fn to_bibtex(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut out = self.entries.join("\n\n");
        out.push('\n');
        out
    }
}

/// A non-fatal problem with one record or field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionWarning {
    /// 1-based position of the record in the document.
    pub record: usize,
    /// The BibTeX field or reference type concerned.
    pub subject: String,
    /// Why the warning was raised.
    pub reason: WarningReason,
    /// Extra information, such as the underlying error.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub detail: Option<String>,
}

impl ConversionWarning {
    /// Create a new warning.
    pub fn new(record: usize, subject: impl Into<String>, reason: WarningReason) -> Self {
        Self {
            record,
            subject: subject.into(),
            reason,
            detail: None,
        }
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {} `{}`", self.record, self.reason, self.subject)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Reason code of a [`ConversionWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WarningReason {
    /// A field BibTeX requires for the entry type is absent.
    MissingRequiredField,
    /// The record's reference type has no BibTeX mapping.
    UnmappedType,
    /// The record failed to convert and was left out.
    RecordSkipped,
}

impl WarningReason {
    /// The reason code as written in reports.
    pub fn code(self) -> &'static str {
        match self {
            WarningReason::MissingRequiredField => "missing-required-field",
            WarningReason::UnmappedType => "unmapped-type",
            WarningReason::RecordSkipped => "record-skipped",
        }
    }
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = ConversionWarning::new(3, "journal", WarningReason::MissingRequiredField);
        assert_eq!(warning.to_string(), "record 3: missing-required-field `journal`");

        let skipped = ConversionWarning::new(1, "article", WarningReason::RecordSkipped)
            .with_detail("unbalanced braces in field `title`");
        assert_eq!(
            skipped.to_string(),
            "record 1: record-skipped `article` (unbalanced braces in field `title`)"
        );
    }

    #[test]
    fn test_to_bibtex_joins_with_blank_line() {
        let result = ConversionResult::ok(vec!["@misc{a,\n}".into(), "@misc{b,\n}".into()]);
        assert_eq!(result.to_bibtex(), "@misc{a,\n}\n\n@misc{b,\n}\n");
        assert_eq!(ConversionResult::default().to_bibtex(), "");
    }

    #[test]
    fn test_count_by_reason() {
        let result = ConversionResult::default()
            .warn(ConversionWarning::new(1, "Map", WarningReason::UnmappedType))
            .warn(ConversionWarning::new(2, "year", WarningReason::MissingRequiredField))
            .warn(ConversionWarning::new(2, "title", WarningReason::MissingRequiredField));
        assert!(result.has_warnings());
        assert_eq!(result.count(WarningReason::MissingRequiredField), 2);
        assert_eq!(result.count(WarningReason::RecordSkipped), 0);
    }
}

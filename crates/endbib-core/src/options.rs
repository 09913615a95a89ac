//! Options for a conversion run.

use crate::StyleMode;

/// Options passed to every conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConvertOptions {
    /// Do not report required BibTeX fields that are missing from a record.
    pub suppress_missing_field_warnings: bool,
    /// Keep bold/italic/... styling as LaTeX commands instead of dropping it.
    pub extract_styled_text: bool,
}

impl ConvertOptions {
    /// Set whether missing-field warnings are suppressed.
    pub fn suppress_missing_field_warnings(mut self, suppress: bool) -> Self {
        self.suppress_missing_field_warnings = suppress;
        self
    }

    /// Set whether styled text is kept.
    pub fn extract_styled_text(mut self, extract: bool) -> Self {
        self.extract_styled_text = extract;
        self
    }

    /// The extraction mode implied by these options.
    pub fn style_mode(&self) -> StyleMode {
        if self.extract_styled_text {
            StyleMode::Latex
        } else {
            StyleMode::Plain
        }
    }
}

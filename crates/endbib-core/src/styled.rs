//! EndNote styled text and its extraction into BibTeX field text.
//!
//! EndNote wraps field text in `<style face="..." font="..." size="...">`
//! elements. The reader turns those into a [`StyledText`] tree; extraction
//! flattens the tree into [`FieldText`], either dropping the styles or turning
//! them into LaTeX commands.

/// Inline style carried by an EndNote `<style>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Normal,
    Bold,
    Italic,
    Underline,
    Superscript,
    Subscript,
}

impl TextStyle {
    /// Parse an EndNote `face` attribute into its styles, outermost first.
    ///
    /// `"bold italic"` yields `[Bold, Italic]`; `"normal"` and unknown words
    /// yield nothing.
    pub fn from_face(face: &str) -> Vec<TextStyle> {
        face.split_whitespace()
            .filter_map(|word| match word.to_ascii_lowercase().as_str() {
                "bold" => Some(TextStyle::Bold),
                "italic" => Some(TextStyle::Italic),
                "underline" => Some(TextStyle::Underline),
                "superscript" | "sup" => Some(TextStyle::Superscript),
                "subscript" | "sub" => Some(TextStyle::Subscript),
                _ => None,
            })
            .collect()
    }

    /// LaTeX command used for this style, if any.
    pub fn latex_command(self) -> Option<&'static str> {
        match self {
            TextStyle::Normal => None,
            TextStyle::Bold => Some("\\textbf"),
            TextStyle::Italic => Some("\\emph"),
            TextStyle::Underline => Some("\\underline"),
            TextStyle::Superscript => Some("\\textsuperscript"),
            TextStyle::Subscript => Some("\\textsubscript"),
        }
    }
}

/// How styles are treated during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// Drop all styling, keep the text.
    #[default]
    Plain,
    /// Wrap styled spans in LaTeX commands.
    Latex,
}

/// A styled text tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StyledText {
    /// A run of plain text.
    Run(String),
    /// A span applying `style` to its children.
    Span {
        style: TextStyle,
        children: Vec<StyledText>,
    },
}

impl StyledText {
    /// Create a text run.
    pub fn run(text: impl Into<String>) -> Self {
        StyledText::Run(text.into())
    }

    /// Create a styled span.
    pub fn span(style: TextStyle, children: Vec<StyledText>) -> Self {
        StyledText::Span { style, children }
    }

    /// Wrap `children` in one span per style, the first style outermost.
    ///
    /// With no styles the children are grouped in a [`TextStyle::Normal`] span.
    pub fn nested(styles: &[TextStyle], children: Vec<StyledText>) -> Self {
        match styles.split_first() {
            None => StyledText::span(TextStyle::Normal, children),
            Some((outer, [])) => StyledText::span(*outer, children),
            Some((outer, rest)) => {
                StyledText::span(*outer, vec![StyledText::nested(rest, children)])
            }
        }
    }

    /// Check whether the tree contains no text at all.
    pub fn is_empty(&self) -> bool {
        match self {
            StyledText::Run(text) => text.is_empty(),
            StyledText::Span { children, .. } => children.iter().all(StyledText::is_empty),
        }
    }

    /// All runs concatenated in document order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            StyledText::Run(text) => out.push_str(text),
            StyledText::Span { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Flatten the tree into field text.
    pub fn extract(&self, mode: StyleMode) -> FieldText {
        let mut out = FieldText::new();
        self.extract_into(mode, &mut out);
        out
    }

    fn extract_into(&self, mode: StyleMode, out: &mut FieldText) {
        match self {
            StyledText::Run(text) => out.push_literal(text),
            StyledText::Span { style, children } => {
                let command = match mode {
                    StyleMode::Plain => None,
                    StyleMode::Latex => style.latex_command(),
                };
                match command {
                    Some(command) if !self.is_empty() => {
                        out.push_markup(command);
                        out.push_markup("{");
                        for child in children {
                            child.extract_into(mode, out);
                        }
                        out.push_markup("}");
                    }
                    _ => {
                        for child in children {
                            child.extract_into(mode, out);
                        }
                    }
                }
            }
        }
    }
}

/// One piece of [`FieldText`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Source text; escaped when serialized.
    Literal(String),
    /// LaTeX markup; emitted verbatim.
    Markup(String),
}

/// Text of a BibTeX field: literal text interleaved with LaTeX markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldText {
    segments: Vec<Segment>,
}

impl FieldText {
    /// Create empty field text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field text holding a single literal.
    pub fn literal(text: impl Into<String>) -> Self {
        let mut out = Self::new();
        out.push_literal(&text.into());
        out
    }

    /// Append literal text, merging with a preceding literal.
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    /// Append markup, merging with preceding markup.
    pub fn push_markup(&mut self, markup: &str) {
        if markup.is_empty() {
            return;
        }
        if let Some(Segment::Markup(last)) = self.segments.last_mut() {
            last.push_str(markup);
        } else {
            self.segments.push(Segment::Markup(markup.to_string()));
        }
    }

    /// The segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Literal text only, markup dropped.
    pub fn plain(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(text) => Some(text.as_str()),
                Segment::Markup(_) => None,
            })
            .collect()
    }

    /// Check whether there is no literal text.
    pub fn is_empty(&self) -> bool {
        self.plain().trim().is_empty()
    }

    /// Trim whitespace at both ends of the literal text.
    ///
    /// Only the first and last segments are touched; whitespace enclosed in
    /// markup is left alone.
    pub fn trim(mut self) -> Self {
        if let Some(Segment::Literal(first)) = self.segments.first_mut() {
            *first = first.trim_start().to_string();
        }
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            *last = last.trim_end().to_string();
        }
        self.segments
            .retain(|segment| !matches!(segment, Segment::Literal(text) if text.is_empty()));
        self
    }
}

impl From<&str> for FieldText {
    fn from(text: &str) -> Self {
        FieldText::literal(text)
    }
}

impl From<String> for FieldText {
    fn from(text: String) -> Self {
        FieldText::literal(text)
    }
}

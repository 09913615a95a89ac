//! EndNote XML reader for endbib.
//!
//! Reads an EndNote XML export into [`RawRecord`]s, one per `<record>`.
//!
//! # Example
//!
//! ```
//! use endbib_read_endnotexml::parse;
//!
//! let xml = br#"<?xml version="1.0"?>
//! <xml><records><record>
//!   <ref-type name="Journal Article">17</ref-type>
//!   <titles><title><style face="normal">A Great Paper</style></title></titles>
//! </record></records></xml>"#;
//! let records = parse(xml).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("title").unwrap().plain_text(), "A Great Paper");
//! ```
//!
//! # Field names
//!
//! EndNote nests most fields inside grouping elements (`titles`, `dates`,
//! `contributors`, ...). A record is flattened as follows:
//!
//! - an element holding only text and `<style>` elements is a field, stored
//!   under its own name (`titles/title` is `title`, `dates/year` is `year`);
//! - repeated `author`, `keyword`, `url` and `date` elements are stored under
//!   their parent's name, one item per line (`authors`, `keywords`,
//!   `related-urls`, `pub-dates`, ...);
//! - `ref-type` is stored from its `name` attribute, or its text when the
//!   attribute is missing;
//! - anything else is descended into. The first occurrence of a name wins.

use endbib_core::{FieldValue, ParseError, RawRecord, StyledText, TextStyle};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Elements that repeat inside a list and name their parent as the field.
const LIST_ITEMS: &[&str] = &["author", "keyword", "url", "date"];

/// Deepest element nesting accepted, counting the root as level 1.
///
/// EndNote exports stay below ten levels; anything deeper is rejected with
/// [`ParseError::TooDeep`] before the record tree is built.
pub const MAX_DEPTH: usize = 256;

/// Parse a whole EndNote XML document.
///
/// Either every record is returned or the document is rejected; a structural
/// error late in the document discards the records read before it.
pub fn parse(input: &[u8]) -> Result<Vec<RawRecord>, ParseError> {
    records(input).collect()
}

/// Iterate over the records of an EndNote XML document as they are read.
///
/// The iterator stops after yielding the first error.
pub fn records(input: &[u8]) -> Records<'_> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;
    Records {
        reader,
        buf: Vec::new(),
        stack: Vec::new(),
        record_depth: None,
        root_seen: false,
        root_closed: false,
        count: 0,
        done: false,
    }
}

/// Lazy record reader returned by [`records`].
pub struct Records<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    stack: Vec<Element>,
    /// Stack index of the `<record>` being read.
    record_depth: Option<usize>,
    root_seen: bool,
    root_closed: bool,
    count: usize,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<RawRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl Records<'_> {
    fn advance(&mut self) -> Option<Result<RawRecord, ParseError>> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Some(Err(ParseError::Invalid {
                        position: self.reader.error_position(),
                        message: e.to_string(),
                    }));
                }
            };

            match event {
                Event::Start(e) => {
                    if self.root_closed {
                        return Some(Err(invalid(
                            self.reader.buffer_position(),
                            "element after the root element",
                        )));
                    }
                    if self.stack.len() >= MAX_DEPTH {
                        return Some(Err(ParseError::TooDeep(MAX_DEPTH)));
                    }
                    self.root_seen = true;
                    let element = Element::from_start(&e);
                    if element.name == "record" && self.record_depth.is_none() {
                        self.record_depth = Some(self.stack.len());
                    }
                    self.stack.push(element);
                }
                Event::End(_) => {
                    let Some(element) = self.stack.pop() else {
                        return Some(Err(invalid(
                            self.reader.buffer_position(),
                            "closing tag without an open element",
                        )));
                    };
                    if self.stack.is_empty() {
                        self.root_closed = true;
                    }
                    if self.record_depth == Some(self.stack.len()) {
                        self.record_depth = None;
                        self.count += 1;
                        let record = element.into_record();
                        tracing::debug!(
                            record = self.count,
                            fields = record.len(),
                            "read EndNote record"
                        );
                        return Some(Ok(record));
                    }
                    if self.record_depth.is_some()
                        && let Some(parent) = self.stack.last_mut()
                    {
                        parent.children.push(Content::Element(element));
                    }
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if self.stack.is_empty() {
                        if text.trim().is_empty() {
                            continue;
                        }
                        return Some(Err(invalid(
                            self.reader.buffer_position(),
                            "text outside the root element",
                        )));
                    }
                    self.push_text(text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if self.stack.is_empty() {
                        return Some(Err(invalid(
                            self.reader.buffer_position(),
                            "CDATA outside the root element",
                        )));
                    }
                    self.push_text(text);
                }
                Event::GeneralRef(_) if self.stack.is_empty() => {
                    return Some(Err(invalid(
                        self.reader.buffer_position(),
                        "entity reference outside the root element",
                    )));
                }
                Event::GeneralRef(e) => {
                    let name = String::from_utf8_lossy(&e).into_owned();
                    let text = match resolve_entity(&name) {
                        Some(c) => c.to_string(),
                        None => {
                            tracing::debug!(entity = %name, "keeping unknown entity reference");
                            format!("&{name};")
                        }
                    };
                    self.push_text(text);
                }
                Event::Eof => {
                    if let Some(open) = self.stack.last() {
                        return Some(Err(ParseError::Unclosed(open.name.clone())));
                    }
                    if !self.root_seen {
                        return Some(Err(ParseError::NoRoot));
                    }
                    if self.count == 0 {
                        return Some(Err(ParseError::NoRecords));
                    }
                    return None;
                }
                _ => {}
            }
        }
    }

    /// Attach text to the innermost element of the current record.
    fn push_text(&mut self, text: String) {
        if self.record_depth.is_none() || text.is_empty() {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            match parent.children.last_mut() {
                Some(Content::Text(last)) => last.push_str(&text),
                _ => parent.children.push(Content::Text(text)),
            }
        }
    }
}

fn invalid(position: u64, message: &str) -> ParseError {
    ParseError::Invalid {
        position,
        message: message.to_string(),
    }
}

/// Resolve a predefined or character entity name (without `&` and `;`).
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// An element inside a record, kept until the record closes.
#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Content>,
}

#[derive(Debug)]
enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        let attrs = e
            .attributes()
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string(),
                    String::from_utf8_lossy(&attr.value).to_string(),
                )
            })
            .collect();
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Content::Text(text) => out.push_str(text),
                Content::Element(e) => out.push_str(&e.text()),
            }
        }
        out
    }

    /// An element whose element children are all `<style>` spans.
    fn is_field(&self) -> bool {
        self.elements().all(|e| e.name == "style")
    }

    fn into_record(self) -> RawRecord {
        let mut record = RawRecord::new();
        collect_fields(&self, &mut record);
        record
    }

    /// The element's content as a field value.
    fn to_value(&self) -> FieldValue {
        if self.elements().next().is_none() {
            FieldValue::Plain(self.text())
        } else {
            FieldValue::Styled(StyledText::nested(&[], self.styled_children()))
        }
    }

    fn to_styled(&self) -> StyledText {
        let styles = match self.name.as_str() {
            "style" => self.attr("face").map(TextStyle::from_face).unwrap_or_default(),
            _ => Vec::new(),
        };
        StyledText::nested(&styles, self.styled_children())
    }

    fn styled_children(&self) -> Vec<StyledText> {
        let has_elements = self.elements().next().is_some();
        self.children
            .iter()
            .filter_map(|child| match child {
                Content::Element(e) => Some(e.to_styled()),
                // Indentation between child elements is layout, not content.
                Content::Text(text)
                    if has_elements && text.contains('\n') && text.trim().is_empty() =>
                {
                    None
                }
                Content::Text(text) => Some(StyledText::run(text.as_str())),
            })
            .collect()
    }
}

fn collect_fields(container: &Element, record: &mut RawRecord) {
    let mut lists: Vec<(&str, Vec<StyledText>)> = Vec::new();

    for child in container.elements() {
        if LIST_ITEMS.contains(&child.name.as_str()) && child.is_field() {
            match lists.iter_mut().find(|(name, _)| *name == container.name) {
                Some((_, items)) => items.push(child.to_styled()),
                None => lists.push((container.name.as_str(), vec![child.to_styled()])),
            }
        } else if child.name == "ref-type" {
            if !record.contains("ref-type") {
                let value = child
                    .attr("name")
                    .map(str::to_string)
                    .unwrap_or_else(|| child.text());
                record.insert("ref-type", value.trim());
            }
        } else if child.is_field() {
            if !record.contains(&child.name) {
                record.insert(child.name.as_str(), child.to_value());
            }
        } else {
            collect_fields(child, record);
        }
    }

    for (name, items) in lists {
        if record.contains(name) {
            continue;
        }
        let mut children = Vec::with_capacity(items.len() * 2);
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                children.push(StyledText::run("\n"));
            }
            children.push(item);
        }
        record.insert(name, StyledText::nested(&[], children));
    }
}

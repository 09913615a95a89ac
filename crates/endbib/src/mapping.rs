//! EndNote reference types and fields mapped onto BibTeX.
//!
//! The table is static: each EndNote reference type names its BibTeX entry
//! type, the fields BibTeX requires for it, and the ordered field rules that
//! fill the entry. A rule lists its EndNote sources in precedence order; the
//! first source with a non-empty value wins.

use endbib_core::{
    ConversionWarning, ConvertOptions, EntryType, FieldText, FieldValue, MappedEntry, RawRecord,
    StyleMode, WarningReason,
};
use regex::Regex;
use std::sync::LazyLock;

/// Reference type assumed when a record has no `ref-type`.
pub const DEFAULT_TYPE: &str = "Generic";

// Four digits not embedded in a longer digit run.
static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").expect("year pattern is valid")
});

/// How source text is turned into a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Text with styles extracted, outer whitespace trimmed.
    Text,
    /// Names split on `;` or newlines, joined with ` and `.
    Names,
    /// The first run of exactly four digits, e.g. `2020` from `2020/05/01`.
    Year,
    /// Items split on `;` or newlines, joined with `, `.
    List,
    /// The first non-empty line.
    First,
}

impl Shape {
    /// Shape `value`, or `None` when nothing usable remains.
    pub fn apply(self, value: &FieldValue, mode: StyleMode) -> Option<FieldText> {
        let shaped = match self {
            Shape::Text => value.extract(mode).trim(),
            Shape::Names => FieldText::literal(split_items(&value.plain_text()).join(" and ")),
            Shape::List => FieldText::literal(split_items(&value.plain_text()).join(", ")),
            Shape::Year => FieldText::literal(normalize_year(&value.plain_text())?),
            Shape::First => FieldText::literal(
                value
                    .plain_text()
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())?,
            ),
        };
        (!shaped.is_empty()).then_some(shaped)
    }
}

/// One BibTeX field and the EndNote fields it is filled from.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub sources: &'static [&'static str],
    pub shape: Shape,
}

const fn rule(field: &'static str, sources: &'static [&'static str], shape: Shape) -> FieldRule {
    FieldRule {
        field,
        sources,
        shape,
    }
}

/// The mapping of one EndNote reference type.
#[derive(Debug)]
pub struct TypeMapping {
    /// EndNote type names and numeric codes, display name first.
    pub names: &'static [&'static str],
    pub entry_type: EntryType,
    /// Fields BibTeX requires for this type.
    pub required: &'static [&'static str],
    /// Field rules in emission order.
    pub fields: &'static [FieldRule],
}

impl TypeMapping {
    /// EndNote's name for the type.
    pub fn name(&self) -> &'static str {
        self.names[0]
    }

    /// Entry type for a particular record of this type.
    ///
    /// EndNote has a single thesis type; the work type tells a master's thesis
    /// apart.
    pub fn entry_type_for(&self, record: &RawRecord) -> EntryType {
        if self.entry_type == EntryType::PhdThesis
            && let Some(work_type) = record.get("work-type")
            && work_type.plain_text().to_lowercase().contains("master")
        {
            return EntryType::MastersThesis;
        }
        self.entry_type
    }

    /// Fields of `record` that no rule of this type reads, sorted.
    pub fn unused_fields<'r>(&self, record: &'r RawRecord) -> Vec<&'r str> {
        let mut unused: Vec<&str> = record
            .field_names()
            .filter(|name| *name != "ref-type")
            .filter(|name| {
                !self
                    .fields
                    .iter()
                    .any(|rule| rule.sources.iter().any(|source| source == name))
            })
            .collect();
        unused.sort_unstable();
        unused
    }
}

const AUTHOR: FieldRule = rule("author", &["authors"], Shape::Names);
const EDITOR: FieldRule = rule("editor", &["secondary-authors"], Shape::Names);
const TITLE: FieldRule = rule("title", &["title"], Shape::Text);
const JOURNAL: FieldRule = rule(
    "journal",
    &["secondary-title", "full-title", "alternate-title", "abbr-1"],
    Shape::Text,
);
const BOOKTITLE: FieldRule = rule("booktitle", &["secondary-title", "alternate-title"], Shape::Text);
const SERIES: FieldRule = rule("series", &["tertiary-title"], Shape::Text);
const YEAR_FIELD: FieldRule = rule("year", &["year", "pub-dates"], Shape::Year);
const VOLUME: FieldRule = rule("volume", &["volume"], Shape::Text);
const NUMBER: FieldRule = rule("number", &["number", "issue"], Shape::Text);
const PAGES: FieldRule = rule("pages", &["pages"], Shape::Text);
const CHAPTER: FieldRule = rule("chapter", &["section"], Shape::Text);
const PUBLISHER: FieldRule = rule("publisher", &["publisher"], Shape::Text);
const SCHOOL: FieldRule = rule("school", &["publisher"], Shape::Text);
const INSTITUTION: FieldRule = rule("institution", &["publisher"], Shape::Text);
const ADDRESS: FieldRule = rule("address", &["pub-location"], Shape::Text);
const EDITION: FieldRule = rule("edition", &["edition"], Shape::Text);
const WORK_TYPE: FieldRule = rule("type", &["work-type"], Shape::Text);
const ISBN: FieldRule = rule("isbn", &["isbn"], Shape::Text);
const ISSN: FieldRule = rule("issn", &["isbn"], Shape::Text);
const DOI: FieldRule = rule("doi", &["electronic-resource-num"], Shape::First);
const URL: FieldRule = rule("url", &["related-urls", "web-urls"], Shape::First);
const URLDATE: FieldRule = rule("urldate", &["access-date"], Shape::Text);
const NOTE: FieldRule = rule("note", &["notes"], Shape::Text);
const ABSTRACT: FieldRule = rule("abstract", &["abstract"], Shape::Text);
const KEYWORDS: FieldRule = rule("keywords", &["keywords"], Shape::List);
const LANGUAGE: FieldRule = rule("language", &["language"], Shape::Text);

const ARTICLE_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, JOURNAL, YEAR_FIELD, VOLUME, NUMBER, PAGES, ISSN, DOI, URL, ABSTRACT, KEYWORDS,
    NOTE, LANGUAGE,
];
const BOOK_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, PUBLISHER, YEAR_FIELD, EDITOR, VOLUME, SERIES, ADDRESS, EDITION, ISBN, DOI,
    URL, ABSTRACT, KEYWORDS, NOTE, LANGUAGE,
];
// An edited book lists its editors as EndNote authors.
const EDITED_BOOK_FIELDS: &[FieldRule] = &[
    rule("editor", &["authors"], Shape::Names),
    TITLE,
    PUBLISHER,
    YEAR_FIELD,
    VOLUME,
    SERIES,
    ADDRESS,
    EDITION,
    ISBN,
    DOI,
    URL,
    ABSTRACT,
    KEYWORDS,
    NOTE,
    LANGUAGE,
];
const SECTION_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, BOOKTITLE, PUBLISHER, YEAR_FIELD, EDITOR, CHAPTER, PAGES, SERIES, ADDRESS,
    EDITION, ISBN, DOI, URL, ABSTRACT, KEYWORDS, NOTE, LANGUAGE,
];
const PAPER_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, BOOKTITLE, YEAR_FIELD, EDITOR, VOLUME, PAGES, PUBLISHER, ADDRESS, SERIES, ISBN,
    DOI, URL, ABSTRACT, KEYWORDS, NOTE, LANGUAGE,
];
const PROCEEDINGS_FIELDS: &[FieldRule] = &[
    TITLE,
    YEAR_FIELD,
    rule("editor", &["secondary-authors", "authors"], Shape::Names),
    VOLUME,
    SERIES,
    PUBLISHER,
    ADDRESS,
    ISBN,
    DOI,
    URL,
    ABSTRACT,
    KEYWORDS,
    NOTE,
];
const THESIS_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, SCHOOL, YEAR_FIELD, WORK_TYPE, ADDRESS, DOI, URL, ABSTRACT, KEYWORDS, NOTE,
    LANGUAGE,
];
const REPORT_FIELDS: &[FieldRule] = &[
    AUTHOR,
    TITLE,
    INSTITUTION,
    YEAR_FIELD,
    WORK_TYPE,
    NUMBER,
    ADDRESS,
    DOI,
    URL,
    ABSTRACT,
    KEYWORDS,
    NOTE,
    LANGUAGE,
];
const ONLINE_FIELDS: &[FieldRule] = &[
    TITLE, URL, AUTHOR, YEAR_FIELD, URLDATE, NOTE, ABSTRACT, KEYWORDS, LANGUAGE,
];
const PATENT_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, NUMBER, YEAR_FIELD, ADDRESS, URL, ABSTRACT, KEYWORDS, NOTE,
];
const UNPUBLISHED_FIELDS: &[FieldRule] = &[
    AUTHOR, TITLE, NOTE, YEAR_FIELD, URL, ABSTRACT, KEYWORDS, LANGUAGE,
];
const MISC_FIELDS: &[FieldRule] = &[
    TITLE,
    AUTHOR,
    YEAR_FIELD,
    rule("howpublished", &["secondary-title", "publisher"], Shape::Text),
    DOI,
    URL,
    NOTE,
    ABSTRACT,
    KEYWORDS,
    LANGUAGE,
];

const ARTICLE_REQUIRED: &[&str] = &["author", "title", "journal", "year"];
const BOOK_REQUIRED: &[&str] = &["author", "title", "publisher", "year"];

/// Every EndNote reference type the converter knows.
pub static TYPE_MAPPINGS: &[TypeMapping] = &[
    TypeMapping {
        names: &["Journal Article", "17"],
        entry_type: EntryType::Article,
        required: ARTICLE_REQUIRED,
        fields: ARTICLE_FIELDS,
    },
    TypeMapping {
        names: &["Magazine Article", "19"],
        entry_type: EntryType::Article,
        required: ARTICLE_REQUIRED,
        fields: ARTICLE_FIELDS,
    },
    TypeMapping {
        names: &["Newspaper Article", "23"],
        entry_type: EntryType::Article,
        required: ARTICLE_REQUIRED,
        fields: ARTICLE_FIELDS,
    },
    TypeMapping {
        names: &["Electronic Article", "43"],
        entry_type: EntryType::Article,
        required: ARTICLE_REQUIRED,
        fields: ARTICLE_FIELDS,
    },
    TypeMapping {
        names: &["Book", "6"],
        entry_type: EntryType::Book,
        required: BOOK_REQUIRED,
        fields: BOOK_FIELDS,
    },
    TypeMapping {
        names: &["Edited Book", "28"],
        entry_type: EntryType::Book,
        required: &["editor", "title", "publisher", "year"],
        fields: EDITED_BOOK_FIELDS,
    },
    TypeMapping {
        names: &["Book Section", "5"],
        entry_type: EntryType::InCollection,
        required: &["author", "title", "booktitle", "publisher", "year"],
        fields: SECTION_FIELDS,
    },
    TypeMapping {
        names: &["Conference Paper", "47"],
        entry_type: EntryType::InProceedings,
        required: &["author", "title", "booktitle", "year"],
        fields: PAPER_FIELDS,
    },
    TypeMapping {
        names: &["Conference Proceedings", "Conference Proceeding", "10"],
        entry_type: EntryType::Proceedings,
        required: &["title", "year"],
        fields: PROCEEDINGS_FIELDS,
    },
    TypeMapping {
        names: &["Thesis", "32"],
        entry_type: EntryType::PhdThesis,
        required: &["author", "title", "school", "year"],
        fields: THESIS_FIELDS,
    },
    TypeMapping {
        names: &["Report", "27"],
        entry_type: EntryType::TechReport,
        required: &["author", "title", "institution", "year"],
        fields: REPORT_FIELDS,
    },
    TypeMapping {
        names: &["Web Page", "12"],
        entry_type: EntryType::Online,
        required: &["title", "url"],
        fields: ONLINE_FIELDS,
    },
    TypeMapping {
        names: &["Electronic Source", "16"],
        entry_type: EntryType::Online,
        required: &["title", "url"],
        fields: ONLINE_FIELDS,
    },
    TypeMapping {
        names: &["Patent", "25"],
        entry_type: EntryType::Patent,
        required: &["author", "title", "number", "year"],
        fields: PATENT_FIELDS,
    },
    TypeMapping {
        names: &["Unpublished Work", "34"],
        entry_type: EntryType::Unpublished,
        required: &["author", "title", "note"],
        fields: UNPUBLISHED_FIELDS,
    },
    TypeMapping {
        names: &["Manuscript", "36"],
        entry_type: EntryType::Unpublished,
        required: &["author", "title", "note"],
        fields: UNPUBLISHED_FIELDS,
    },
    TypeMapping {
        names: &[DEFAULT_TYPE, "13"],
        entry_type: EntryType::Misc,
        required: &["title"],
        fields: MISC_FIELDS,
    },
];

/// Find the mapping for an EndNote reference type name or numeric code.
pub fn lookup_type(name: &str) -> Option<&'static TypeMapping> {
    let name = name.trim();
    TYPE_MAPPINGS
        .iter()
        .find(|mapping| mapping.names.iter().any(|n| n.eq_ignore_ascii_case(name)))
}

/// Map one record onto a BibTeX entry.
///
/// Returns `None` when the record's reference type has no mapping; that and
/// every missing required field (unless suppressed) are pushed onto `warnings`.
pub fn map_record(
    record: &RawRecord,
    index: usize,
    options: &ConvertOptions,
    warnings: &mut Vec<ConversionWarning>,
) -> Option<MappedEntry> {
    let type_name = record
        .get("ref-type")
        .map(|value| value.plain_text().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());

    let Some(mapping) = lookup_type(&type_name) else {
        tracing::warn!(record = index, ref_type = %type_name, "no BibTeX mapping for reference type");
        warnings.push(ConversionWarning::new(
            index,
            type_name,
            WarningReason::UnmappedType,
        ));
        return None;
    };

    let mode = options.style_mode();
    let mut entry = MappedEntry::new(mapping.entry_type_for(record));
    for rule in mapping.fields {
        let value = rule
            .sources
            .iter()
            .filter_map(|source| record.get(source))
            .filter(|value| !value.is_blank())
            .find_map(|value| rule.shape.apply(value, mode));
        if let Some(value) = value {
            entry.set(rule.field, value);
        }
    }

    for field in mapping.unused_fields(record) {
        tracing::debug!(record = index, field, "EndNote field has no BibTeX counterpart");
    }

    if !options.suppress_missing_field_warnings {
        for field in mapping.required {
            if !entry.contains(field) {
                tracing::debug!(record = index, field, "missing required field");
                warnings.push(ConversionWarning::new(
                    index,
                    *field,
                    WarningReason::MissingRequiredField,
                ));
            }
        }
    }

    Some(entry)
}

/// Split an EndNote list on semicolons and newlines, dropping empty items.
fn split_items(text: &str) -> Vec<&str> {
    text.split([';', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// The year component of a date, as four digits.
pub fn normalize_year(date: &str) -> Option<String> {
    YEAR.captures(date)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

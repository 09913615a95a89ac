//! Edge case tests for endbib.
//!
//! Tests Unicode handling, entity references, structural extremes, and other
//! edge cases.

use endbib::endnotexml::MAX_DEPTH;
use endbib::{ConversionResult, ConvertOptions, ParseError, WarningReason};

/// Wrap record bodies in an EndNote XML document.
fn document(records: &[impl AsRef<str>]) -> Vec<u8> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xml><records>\n");
    for record in records {
        xml.push_str("<record>");
        xml.push_str(record.as_ref());
        xml.push_str("</record>\n");
    }
    xml.push_str("</records></xml>\n");
    xml.into_bytes()
}

fn generic(title: &str) -> String {
    format!("<ref-type name=\"Generic\">13</ref-type><titles><title>{title}</title></titles>")
}

fn convert(records: &[impl AsRef<str>]) -> ConversionResult {
    endbib::convert(&document(records), &ConvertOptions::default()).unwrap()
}

fn convert_styled(records: &[impl AsRef<str>]) -> ConversionResult {
    let options = ConvertOptions::default().extract_styled_text(true);
    endbib::convert(&document(records), &options).unwrap()
}

mod unicode {
    use super::*;

    #[test]
    fn test_emoji_basic() {
        let result = convert(&[&generic("Hello 👋 World")]);
        assert!(result.entries[0].contains("title = {Hello 👋 World}"));
    }

    #[test]
    fn test_emoji_zwj_sequence() {
        let result = convert(&[&generic("Family: 👨‍👩‍👧‍👦")]);
        assert!(result.entries[0].contains("👨‍👩‍👧‍👦"));
    }

    #[test]
    fn test_cjk_title() {
        let result = convert(&[&generic("中文标题 日本語 한국어")]);
        assert!(result.entries[0].contains("title = {中文标题 日本語 한국어}"));
    }

    #[test]
    fn test_rtl_arabic() {
        let result = convert(&[&generic("مرحبا بالعالم")]);
        assert!(result.entries[0].contains("مرحبا بالعالم"));
    }

    #[test]
    fn test_combining_characters() {
        let title = "Cafe\u{0301}";
        let result = convert(&[&generic(title)]);
        assert!(result.entries[0].contains(title));
    }

    #[test]
    fn test_non_ascii_author_key() {
        let record = "<ref-type name=\"Journal Article\">17</ref-type>\
            <contributors><authors><author>Müller, Jörg</author></authors></contributors>\
            <titles><title>Über</title><secondary-title>Z</secondary-title></titles>\
            <dates><year>1999</year></dates>";
        let result = convert(&[record]);
        assert!(result.entries[0].starts_with("@article{müller1999,"));
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_greek_and_math_symbols() {
        let result = convert(&[&generic("α-helix ≤ β ∑")]);
        assert!(result.entries[0].contains("α-helix ≤ β ∑"));
    }
}

mod entities {
    use super::*;

    #[test]
    fn test_predefined_entities_resolved_then_escaped() {
        let result = convert(&[&generic("R&amp;D &lt;fast&gt; &quot;x&quot;")]);
        assert!(result.entries[0].contains("title = {R\\&D <fast> \"x\"}"));
    }

    #[test]
    fn test_numeric_character_references() {
        let result = convert(&[&generic("&#233;t&#xE9;")]);
        assert!(result.entries[0].contains("title = {été}"));
    }

    #[test]
    fn test_cdata_is_text() {
        let result = convert(&[&generic("<![CDATA[50% & more]]>")]);
        assert!(result.entries[0].contains("title = {50\\% \\& more}"));
    }
}

mod escaping {
    use super::*;

    #[test]
    fn test_braces_in_text() {
        let result = convert(&[&generic("{DNA} repair")]);
        assert!(result.entries[0].contains("title = {\\{DNA\\} repair}"));
    }

    #[test]
    fn test_backslash() {
        let result = convert(&[&generic("C:\\data")]);
        assert!(result.entries[0].contains("title = {C:\\textbackslash{}data}"));
    }

    #[test]
    fn test_url_is_escaped() {
        let record = "<ref-type name=\"Web Page\">12</ref-type>\
            <titles><title>Site</title></titles>\
            <urls><related-urls><url>https://example.org/a_b?x=1&amp;y=50%</url></related-urls></urls>";
        let result = convert(&[record]);
        assert!(
            result.entries[0].contains("url = {https://example.org/a\\_b?x=1\\&y=50\\%}"),
            "{}",
            result.entries[0]
        );
    }

    #[test]
    fn test_styled_markup_survives_escaping() {
        let record = generic("<style face=\"bold\">100%</style> sure");
        let result = convert_styled(&[&record]);
        assert!(result.entries[0].contains("title = {\\textbf{100\\%} sure}"));
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_deeply_nested_styles() {
        let mut title = String::from("core");
        for _ in 0..50 {
            title = format!("<style face=\"italic\">{title}</style>");
        }
        let record = generic(&title);

        let plain = convert(&[&record]);
        assert!(plain.entries[0].contains("title = {core}"));

        let styled = convert_styled(&[&record]);
        let expected = format!("{}core{}", "\\emph{".repeat(50), "}".repeat(50));
        assert!(styled.entries[0].contains(&expected));
    }

    #[test]
    fn test_empty_style_span_emits_nothing() {
        let record = generic("A<style face=\"bold\"></style>B");
        let result = convert_styled(&[&record]);
        assert!(result.entries[0].contains("title = {AB}"));
    }

    #[test]
    fn test_whitespace_only_title_is_missing() {
        let record = generic("   ");
        let result = convert(&[&record]);
        assert_eq!(result.entries, ["@misc{entry1,\n}"]);
        assert_eq!(result.count(WarningReason::MissingRequiredField), 1);
    }

    #[test]
    fn test_empty_record() {
        let result = convert(&[""]);
        assert_eq!(result.entries, ["@misc{entry1,\n}"]);
        assert_eq!(result.warnings[0].subject, "title");
    }

    #[test]
    fn test_many_records() {
        let bodies: Vec<String> = (0..500).map(|i| generic(&format!("Title {i}"))).collect();
        let result = convert(&bodies);
        assert_eq!(result.entries.len(), 500);
        assert!(result.entries[499].starts_with("@misc{entry500,"));
    }

    #[test]
    fn test_unknown_elements_are_ignored() {
        let record = format!("{}<custom7>local</custom7><foo><bar>x</bar></foo>", generic("T"));
        let result = convert(&[&record]);
        assert_eq!(result.entries, ["@misc{entry1,\n  title = {T},\n}"]);
    }

    #[test]
    fn test_document_without_root() {
        let err = endbib::convert(b"", &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::NoRoot));
    }

    fn nested_styles(levels: usize) -> String {
        let mut title = String::from("core");
        for _ in 0..levels {
            title = format!("<style face=\"bold\">{title}</style>");
        }
        generic(&title)
    }

    #[test]
    fn test_nesting_up_to_limit() {
        // The title sits five levels deep: xml, records, record, titles, title.
        let record = nested_styles(MAX_DEPTH - 5);
        let result = convert_styled(&[&record]);
        assert!(result.entries[0].contains("\\textbf{\\textbf{core}}"));
    }

    #[test]
    fn test_nesting_past_limit_is_error() {
        let record = nested_styles(MAX_DEPTH - 4);
        let err = endbib::convert(&document(&[&record]), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_deep_unknown_elements_are_error() {
        let depth = 2000;
        let record = format!("{}{}", "<foo>".repeat(depth), "</foo>".repeat(depth));
        let err = endbib::convert(&document(&[&record]), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep(_)));
    }

    #[test]
    fn test_second_root_element() {
        let mut xml = document(&[&generic("T")]);
        xml.extend_from_slice(b"<xml><records><record></record></records></xml>");
        let err = endbib::convert(&xml, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Invalid { .. }));
    }

    #[test]
    fn test_text_after_root() {
        let mut xml = document(&[&generic("T")]);
        xml.extend_from_slice(b"trailing garbage\n");
        let err = endbib::convert(&xml, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Invalid { .. }));
    }

    #[test]
    fn test_text_before_root() {
        let mut xml = b"leading garbage".to_vec();
        xml.extend_from_slice(&document(&[&generic("T")]));
        let err = endbib::convert(&xml, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Invalid { .. }));
    }

    #[test]
    fn test_year_inside_longer_number() {
        let record = "<ref-type name=\"Journal Article\">17</ref-type>\
            <contributors><authors><author>Smith, Ann</author></authors></contributors>\
            <titles><title>T</title><secondary-title>J</secondary-title></titles>\
            <dates><year>12345</year></dates>";
        let result = convert(&[record]);
        assert!(result.entries[0].starts_with("@article{entry1,"));
        assert!(!result.entries[0].contains("year ="));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].subject, "year");
    }

    #[test]
    fn test_mismatched_tags() {
        let err = endbib::convert(
            b"<xml><records><record><titles></record></records></xml>",
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid { .. }));
    }
}

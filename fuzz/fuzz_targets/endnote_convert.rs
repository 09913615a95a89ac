#![no_main]

use arbitrary::Arbitrary;
use endbib::{ConvertOptions, WarningReason};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    styled: bool,
    quiet_missing: bool,
    xml: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let options = ConvertOptions::default()
        .extract_styled_text(input.styled)
        .suppress_missing_field_warnings(input.quiet_missing);

    let Ok(first) = endbib::convert(input.xml, &options) else {
        return;
    };
    let second = endbib::convert(input.xml, &options).expect("second run failed");
    assert_eq!(first, second, "conversion is not deterministic");

    let records = endbib::endnotexml::parse(input.xml).expect("parse disagrees with convert");
    let dropped =
        first.count(WarningReason::UnmappedType) + first.count(WarningReason::RecordSkipped);
    assert_eq!(first.entries.len() + dropped, records.len());

    if input.quiet_missing {
        assert_eq!(first.count(WarningReason::MissingRequiredField), 0);
    }

    let mut keys = std::collections::HashSet::new();
    for entry in &first.entries {
        let key = entry
            .split_once('{')
            .and_then(|(_, rest)| rest.split_once(','))
            .map(|(key, _)| key)
            .expect("entry has a key");
        assert!(keys.insert(key), "duplicate key {key}");
    }
});

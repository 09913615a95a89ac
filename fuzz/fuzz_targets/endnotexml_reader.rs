#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let streamed: Vec<_> = endbib::endnotexml::records(data).collect();

    // The iterator stops at the first error
    if let Some(pos) = streamed.iter().position(Result::is_err) {
        assert_eq!(pos, streamed.len() - 1);
    }

    match endbib::endnotexml::parse(data) {
        Ok(records) => {
            assert!(streamed.iter().all(Result::is_ok));
            assert_eq!(records.len(), streamed.len());
        }
        Err(_) => assert!(streamed.last().is_some_and(Result::is_err)),
    }
});

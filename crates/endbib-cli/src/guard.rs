//! Refuse input files that are log files rather than EndNote exports.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Conventional name of a conversion log.
const CONVERSION_LOG_NAME: &str = "conversion_log.txt";

/// A line opening with a timestamp followed by a level marker, either
/// `[2024-01-31 12:00:00] INFO: ...` or `2024-01-31T12:00:00.123Z  WARN ...`.
static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:\[[0-9]{4}-[0-9]{2}-[0-9]{2}[ T][0-9]{2}:[0-9]{2}:[0-9]{2}\]|[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}\S*)\s+(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR)\b",
    )
    .expect("log line pattern is valid")
});

/// Check whether `input` is a log file, by name or by content.
///
/// `log_file` is the log file configured for this run, if any.
pub fn looks_like_log(input: &Path, content: &[u8], log_file: Option<&Path>) -> bool {
    let named_like_log = input
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(CONVERSION_LOG_NAME));
    if named_like_log {
        return true;
    }
    if let Some(log_file) = log_file
        && same_file(input, log_file)
    {
        return true;
    }
    LOG_LINE.is_match(&String::from_utf8_lossy(content))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

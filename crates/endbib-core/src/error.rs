//! Errors raised while reading or writing.

/// A document-level failure. The whole conversion is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid XML at byte {position}: {message}")]
    Invalid { position: u64, message: String },
    #[error("unexpected end of document: <{0}> is never closed")]
    Unclosed(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("no <record> elements found")]
    NoRecords,
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure serializing a single entry.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("invalid field name `{0}`")]
    InvalidFieldName(String),
    #[error("unbalanced braces in field `{0}`")]
    UnbalancedBraces(String),
}

//! Error types for descriptor parsing.

use std::fmt;
use std::io;
use std::sync::Arc;

/// What went wrong on a descriptor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `ffconcat` not followed by `version 1.0`.
    InvalidVersion,
    /// `file` without a name.
    FilenameRequired,
    /// `duration` before any `file`.
    DurationWithoutFile,
    /// Unparseable time value.
    InvalidDuration,
    /// Directive not recognized.
    UnknownKeyword,
    /// Name rejected by the safe-filename rule.
    UnsafeLocation,
    /// The entry list could not grow.
    Resource,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidVersion => "invalid version",
            Self::FilenameRequired => "filename required",
            Self::DurationWithoutFile => "duration without file",
            Self::InvalidDuration => "invalid duration",
            Self::UnknownKeyword => "unknown keyword",
            Self::UnsafeLocation => "unsafe file name",
            Self::Resource => "out of memory",
        };
        f.write_str(msg)
    }
}

/// A fatal error at a specific descriptor line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind} '{token}'")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// Failure category.
    pub kind: ParseErrorKind,
    /// The offending token (empty when it was missing).
    pub token: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(line: usize, kind: ParseErrorKind, token: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            token: token.into(),
        }
    }
}

/// Errors returned by the parser entry points.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to read descriptor: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl Error {
    /// The parse error, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(_) => None,
        }
    }
}

/// Result type alias using the parser error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(3, ParseErrorKind::UnknownKeyword, "flie");
        assert_eq!(err.to_string(), "line 3: unknown keyword 'flie'");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.as_parse().is_none());
    }
}

//! # segcat-parser
//!
//! A parser for ffconcat segment-list descriptors.
//!
//! A descriptor is a line-oriented list of `file` directives, each optionally
//! followed by a `duration`. An optional `ffconcat version 1.0` header marks
//! the versioned format and, in [`SafeMode::Auto`], turns on the
//! safe-filename rule from that line on.
//!
//! ## Quick Start
//!
//! ```
//! use segcat_parser::parse;
//!
//! let script = parse("ffconcat version 1.0\nfile a.ts\nduration 10\nfile b.ts\n").unwrap();
//!
//! assert_eq!(script.entries.len(), 2);
//! assert_eq!(script.entries[0].duration, Some(10_000_000));
//! assert_eq!(script.entries[1].duration, None);
//! ```
//!
//! ## Configurable Parsing
//!
//! ```
//! use segcat_parser::{Parser, SafeMode};
//! use segcat_parser::config::ParserConfig;
//!
//! let config = ParserConfig::builder()
//!     .safe(SafeMode::On)
//!     .base("/media/show/list.ffconcat")
//!     .build();
//!
//! let parser = Parser::new(config);
//! let script = parser.parse("file part1.ts\n").unwrap();
//! assert_eq!(script.entries[0].location, "/media/show/part1.ts");
//!
//! assert!(parser.parse("file ../escape.ts\n").is_err());
//! ```

pub mod config;
pub mod error;
pub mod lexer;
mod script;

use std::io::BufRead;

pub use config::{ParserConfig, SafeMode};
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use script::{Script, ScriptEntry, VERSION_HEADER};

/// Score reported by [`probe`] for a versioned descriptor.
pub const PROBE_SCORE_MAX: u32 = 100;

/// Parse a descriptor using default settings.
///
/// # Examples
///
/// ```
/// use segcat_parser::parse;
///
/// let script = parse("file a.ts\nfile b.ts\n").unwrap();
/// assert_eq!(script.entries[1].location, "b.ts");
/// ```
pub fn parse(input: &str) -> Result<Script> {
    Parser::default().parse(input)
}

/// Score how likely `buf` is the start of a concat descriptor.
///
/// Only the versioned format can be recognized; a headerless list scores 0.
///
/// ```
/// use segcat_parser::{probe, PROBE_SCORE_MAX};
///
/// assert_eq!(probe(b"ffconcat version 1.0\nfile a.ts\n"), PROBE_SCORE_MAX);
/// assert_eq!(probe(b"file a.ts\n"), 0);
/// ```
pub fn probe(buf: &[u8]) -> u32 {
    if buf.starts_with(VERSION_HEADER.as_bytes()) {
        PROBE_SCORE_MAX
    } else {
        0
    }
}

/// A configurable descriptor parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Get the parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a descriptor held in memory.
    pub fn parse(&self, input: &str) -> Result<Script> {
        script::ScriptParser::new(&self.config).parse_str(input)
    }

    /// Parse a descriptor from a buffered reader, one line at a time.
    ///
    /// Read failures surface as [`Error::Io`].
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Script> {
        script::ScriptParser::new(&self.config).parse_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe() {
        assert_eq!(probe(b"ffconcat version 1.0"), PROBE_SCORE_MAX);
        assert_eq!(probe(b"ffconcat version 1."), 0);
        assert_eq!(probe(b" ffconcat version 1.0"), 0);
        assert_eq!(probe(b""), 0);
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = parse("file a.ts\nbogus\n").unwrap_err();
        let parse_err = err.as_parse().unwrap();
        assert_eq!(parse_err.line, 2);
        assert_eq!(parse_err.kind, ParseErrorKind::UnknownKeyword);
    }

    #[test]
    fn test_parser_config_accessor() {
        let parser = Parser::new(ParserConfig::builder().safe(SafeMode::Off).build());
        assert_eq!(parser.config().safe, SafeMode::Off);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_script_serializes() {
        let script = parse("file a.ts\nduration 2\n").unwrap();
        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(json["entries"][0]["location"], "a.ts");
        assert_eq!(json["entries"][0]["duration"], 2_000_000);
    }
}

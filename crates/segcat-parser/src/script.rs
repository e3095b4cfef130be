//! Directive parsing for concat descriptors.

use std::io::BufRead;

use segcat_common::paths::{is_safe_location, make_absolute};
use segcat_common::time::parse_duration;

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseErrorKind, Result};
use crate::lexer::{unquote, Lexer};

/// Magic line that opens a versioned descriptor.
pub const VERSION_HEADER: &str = "ffconcat version 1.0";

/// One `file` directive and the directives that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptEntry {
    /// Location resolved against the descriptor's own location.
    pub location: String,
    /// Declared duration in microseconds.
    pub duration: Option<i64>,
    /// Line of the `file` directive.
    pub line: usize,
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    /// Entries in declaration order.
    pub entries: Vec<ScriptEntry>,
    /// Whether an `ffconcat version 1.0` line was seen.
    pub has_version_header: bool,
    /// Whether the safe-filename rule was in force at the end of parsing.
    pub safety_active: bool,
}

impl Script {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the descriptor declared no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Line-by-line parse state.
pub(crate) struct ScriptParser<'a> {
    config: &'a ParserConfig,
    script: Script,
}

impl<'a> ScriptParser<'a> {
    pub(crate) fn new(config: &'a ParserConfig) -> Self {
        let safety_active = config.safe.is_active(false);
        Self {
            config,
            script: Script {
                safety_active,
                ..Script::default()
            },
        }
    }

    pub(crate) fn parse_str(mut self, input: &str) -> Result<Script> {
        for (idx, line) in input.lines().enumerate() {
            self.feed_line(idx + 1, line)?;
        }
        Ok(self.script)
    }

    pub(crate) fn parse_reader<R: BufRead>(mut self, mut reader: R) -> Result<Script> {
        let mut buf = String::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                break;
            }
            line_no += 1;
            self.feed_line(line_no, &buf)?;
        }
        Ok(self.script)
    }

    fn feed_line(&mut self, line_no: usize, line: &str) -> std::result::Result<(), ParseError> {
        let lexer = Lexer::new(line);
        let mut words = lexer.words();

        let Some(keyword) = words.next() else {
            return Ok(());
        };
        if keyword.starts_with('#') {
            return Ok(());
        }

        match keyword {
            "file" => {
                let raw = words.next().ok_or_else(|| {
                    ParseError::new(line_no, ParseErrorKind::FilenameRequired, "")
                })?;
                let name = unquote(raw);
                if name.is_empty() {
                    return Err(ParseError::new(line_no, ParseErrorKind::FilenameRequired, raw));
                }
                if self.script.safety_active && !is_safe_location(&name) {
                    return Err(ParseError::new(line_no, ParseErrorKind::UnsafeLocation, name));
                }
                let location = make_absolute(self.config.base.as_deref(), &name);

                self.script
                    .entries
                    .try_reserve(1)
                    .map_err(|_| ParseError::new(line_no, ParseErrorKind::Resource, raw))?;
                self.script.entries.push(ScriptEntry {
                    location,
                    duration: None,
                    line: line_no,
                });
            }
            "duration" => {
                let raw = words.next().unwrap_or("");
                let entry = self.script.entries.last_mut().ok_or_else(|| {
                    ParseError::new(line_no, ParseErrorKind::DurationWithoutFile, keyword)
                })?;
                let value = parse_duration(raw)
                    .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidDuration, raw))?;
                entry.duration = Some(value);
            }
            "ffconcat" => {
                let version = words.next().unwrap_or("");
                if version != "version" {
                    return Err(ParseError::new(line_no, ParseErrorKind::InvalidVersion, version));
                }
                let number = words.next().unwrap_or("");
                if number != "1.0" {
                    return Err(ParseError::new(line_no, ParseErrorKind::InvalidVersion, number));
                }
                self.script.has_version_header = true;
                self.script.safety_active = self.config.safe.is_active(true);
            }
            other => {
                return Err(ParseError::new(line_no, ParseErrorKind::UnknownKeyword, other));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SafeMode;
    use crate::error::Error;

    fn parse_with(input: &str, safe: SafeMode) -> Result<Script> {
        let config = ParserConfig::builder().safe(safe).build();
        ScriptParser::new(&config).parse_str(input)
    }

    fn parse_err(input: &str, safe: SafeMode) -> ParseError {
        match parse_with(input, safe) {
            Err(Error::Parse(err)) => err,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_basic_script() {
        let script = parse_with(
            "ffconcat version 1.0\nfile a.ts\nduration 10\nfile b.ts\nduration 20\n",
            SafeMode::Auto,
        )
        .unwrap();

        assert!(script.has_version_header);
        assert!(script.safety_active);
        assert_eq!(script.len(), 2);
        assert_eq!(script.entries[0].location, "a.ts");
        assert_eq!(script.entries[0].duration, Some(10_000_000));
        assert_eq!(script.entries[1].duration, Some(20_000_000));
        assert_eq!(script.entries[1].line, 4);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let script = parse_with("# header\n\n   \nfile a.ts\n  #note\n", SafeMode::Auto).unwrap();
        assert_eq!(script.len(), 1);
        assert!(!script.has_version_header);
        assert!(!script.safety_active);
    }

    #[test]
    fn test_whitespace_insensitive() {
        let compact = parse_with("file a.ts\nduration 5\n", SafeMode::Auto).unwrap();
        let spaced = parse_with("  \tfile\t\ta.ts  \r\n duration   5 \t\r\n", SafeMode::Auto).unwrap();
        assert_eq!(compact, spaced);
    }

    #[test]
    fn test_quoted_and_escaped_names() {
        let script = parse_with("file 'my clip.ts'\nfile other\\ clip.ts\n", SafeMode::Off).unwrap();
        assert_eq!(script.entries[0].location, "my clip.ts");
        assert_eq!(script.entries[1].location, "other clip.ts");
    }

    #[test]
    fn test_trailing_tokens_ignored() {
        let script = parse_with("file a.ts extra words\nduration 1 more\n", SafeMode::Auto).unwrap();
        assert_eq!(script.entries[0].location, "a.ts");
        assert_eq!(script.entries[0].duration, Some(1_000_000));
    }

    #[test]
    fn test_base_resolution() {
        let config = ParserConfig::builder().base("/media/show/list.ffconcat").build();
        let script = ScriptParser::new(&config).parse_str("file part1.ts\n").unwrap();
        assert_eq!(script.entries[0].location, "/media/show/part1.ts");
    }

    #[test]
    fn test_filename_required() {
        let err = parse_err("file\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::FilenameRequired);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_duration_without_file() {
        let err = parse_err("\nduration 10\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::DurationWithoutFile);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_invalid_duration() {
        let err = parse_err("file a.ts\nduration ten\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::InvalidDuration);
        assert_eq!(err.token, "ten");

        let err = parse_err("file a.ts\nduration\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::InvalidDuration);
    }

    #[test]
    fn test_unknown_keyword() {
        let err = parse_err("file a.ts\ninpoint 3\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::UnknownKeyword);
        assert_eq!(err.token, "inpoint");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_invalid_version() {
        let err = parse_err("ffconcat version 2.0\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::InvalidVersion);
        assert_eq!(err.token, "2.0");

        let err = parse_err("ffconcat\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::InvalidVersion);
    }

    #[test]
    fn test_safe_mode_on_rejects_traversal() {
        let err = parse_err("file ../escape.ts\n", SafeMode::On);
        assert_eq!(err.kind, ParseErrorKind::UnsafeLocation);
        assert_eq!(err.token, "../escape.ts");

        let err = parse_err("file /abs/path.ts\n", SafeMode::On);
        assert_eq!(err.kind, ParseErrorKind::UnsafeLocation);
    }

    #[test]
    fn test_safe_mode_on_accepts_subdirectories() {
        let script = parse_with("file sub/dir/clip.ts\n", SafeMode::On).unwrap();
        assert_eq!(script.entries[0].location, "sub/dir/clip.ts");
    }

    #[test]
    fn test_safe_mode_auto_without_header() {
        let script = parse_with("file ../escape.ts\n", SafeMode::Auto).unwrap();
        assert_eq!(script.entries[0].location, "../escape.ts");
    }

    #[test]
    fn test_safe_mode_auto_after_header() {
        let err = parse_err("ffconcat version 1.0\nfile /abs/path.ts\n", SafeMode::Auto);
        assert_eq!(err.kind, ParseErrorKind::UnsafeLocation);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_safe_mode_auto_header_applies_from_its_line_on() {
        let script = parse_with("file /early.ts\nffconcat version 1.0\n", SafeMode::Auto).unwrap();
        assert_eq!(script.entries[0].location, "/early.ts");
    }

    #[test]
    fn test_safe_mode_off_with_header() {
        let script = parse_with("ffconcat version 1.0\nfile /abs/path.ts\n", SafeMode::Off).unwrap();
        assert!(!script.safety_active);
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn test_reader_matches_str() {
        let input = "ffconcat version 1.0\nfile a.ts\nduration 1.5\n";
        let config = ParserConfig::default();
        let from_str = ScriptParser::new(&config).parse_str(input).unwrap();
        let from_reader = ScriptParser::new(&config)
            .parse_reader(std::io::Cursor::new(input))
            .unwrap();
        assert_eq!(from_str, from_reader);
    }
}

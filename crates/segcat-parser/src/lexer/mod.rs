//! Logos-based lexer for descriptor lines.
//!
//! This module provides tokenization using the [logos](https://docs.rs/logos) crate,
//! which generates a fast lexer from regex patterns at compile time.

mod token;
pub use token::Token;

use logos::Logos;
use std::ops::Range;

/// Byte span in the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// A lexer that tokenizes one descriptor line using Logos.
pub struct Lexer<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    input: &'src str,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given line.
    ///
    /// Tokenizes the entire line immediately.
    pub fn new(input: &'src str) -> Self {
        let tokens: Vec<_> = Token::lexer(input)
            .spanned()
            .filter_map(|(tok, span)| tok.ok().map(|t| (t, Span::from(span))))
            .collect();
        Self { tokens, input }
    }

    /// Get all tokens with their spans.
    pub fn tokens(&self) -> &[(Token<'src>, Span)] {
        &self.tokens
    }

    /// Iterate over the raw text of each token.
    pub fn words(&self) -> impl Iterator<Item = &'src str> + '_ {
        self.tokens.iter().map(|(tok, _)| tok.text())
    }

    /// Get the original input line.
    pub fn input(&self) -> &'src str {
        self.input
    }
}

/// Resolve quotes and escapes in a raw token.
///
/// Text between single quotes is taken verbatim, a backslash takes the next
/// character literally, and a trailing lone backslash is kept as is.
///
/// # Examples
///
/// ```
/// use segcat_parser::lexer::unquote;
///
/// assert_eq!(unquote("'my clip.ts'"), "my clip.ts");
/// assert_eq!(unquote(r"my\ clip.ts"), "my clip.ts");
/// assert_eq!(unquote(r"it\'s.ts"), "it's.ts");
/// ```
pub fn unquote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            '\'' => {
                for quoted in chars.by_ref() {
                    if quoted == '\'' {
                        break;
                    }
                    out.push(quoted);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

//! Token types for the Logos-based lexer.

use logos::Logos;

/// Token types recognized by the lexer.
///
/// A descriptor line is a sequence of whitespace-separated words. Single
/// quotes protect whitespace and a backslash escapes the next character, so
/// a quoted or escaped file name stays one token. The slice is kept raw;
/// [`unquote`](super::unquote) turns it into the value it denotes.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    /// A word, possibly containing quoted sections and escapes.
    ///
    /// An unterminated quote runs to the end of the line.
    #[regex(r"([^ \t\r\n\f'\\]|\\[^\r\n]?|'[^']*'?)+", |lex| lex.slice())]
    Word(&'src str),
}

impl<'src> Token<'src> {
    /// The raw text of the token.
    pub fn text(&self) -> &'src str {
        match self {
            Token::Word(text) => text,
        }
    }
}

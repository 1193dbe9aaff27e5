//! Token types produced by the allotment lexer.

use std::fmt;

/// Kinds of tokens in the allotment language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The `untagged` keyword.
    Untagged,
    /// The `from` keyword.
    From,
    /// The `to` keyword.
    To,
    LBrace,
    RBrace,
    /// The phrase `end of time`, with any whitespace between the words.
    EndOfTime,
    /// A `YYYY-MM-DD` literal.
    Date,
    /// A three-letter weekday abbreviation.
    Weekday,
    /// An hours literal such as `8`, `-2:30` or `+1:15`.
    Hours,
    /// A double-quoted string, quotes included.
    Str,
    /// A bare word.
    Word,
    /// End of input. Emitted repeatedly once the source is exhausted.
    Eof,
}

impl TokenKind {
    /// Human readable name used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Untagged => "untagged",
            Self::From => "from",
            Self::To => "to",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::EndOfTime => "<end-of-time>",
            Self::Date => "<date>",
            Self::Weekday => "<weekday>",
            Self::Hours => "<hours>",
            Self::Str => "<str>",
            Self::Word => "<word>",
            Self::Eof => "<end-of-file>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The matched text. Empty for [`TokenKind::Eof`].
    pub lexeme: &'a str,
    /// 1-based line on which the token starts.
    pub line: usize,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

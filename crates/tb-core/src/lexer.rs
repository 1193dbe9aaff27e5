//! Lexer for the allotment language.
//!
//! Tokens are recognised by trying a fixed, ordered list of candidates at the
//! current position: the literal keywords and braces first, then the patterns
//! in declaration order. The first candidate that matches wins. The order is
//! load-bearing: `mon` lexes as a weekday and never as a word, and `monday`
//! lexes as the weekday `mon` followed by the word `day`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::token::{Token, TokenKind};

/// Literal tokens, tried before any pattern.
const LITERALS: [(&str, TokenKind); 5] = [
    ("untagged", TokenKind::Untagged),
    ("from", TokenKind::From),
    ("to", TokenKind::To),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
];

/// Pattern tokens in priority order. Every pattern is anchored at the cursor.
static PATTERNS: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    [
        (TokenKind::EndOfTime, r"^end\s+of\s+time"),
        (TokenKind::Date, r"^[0-9]{4}-[0-9]{2}-[0-9]{2}"),
        (TokenKind::Weekday, r"^(?:sun|mon|tue|wed|thu|fri|sat)"),
        (TokenKind::Hours, r"^[-+]?[0-9]+(?::[0-5][0-9])?"),
        (TokenKind::Str, r#"^"(?:\\"|[^"])+""#),
        (TokenKind::Word, r"^\w+"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// Scanner over an in-memory allotment source.
///
/// The cursor (byte position and line number) lives in the lexer value, so
/// independent sources can be scanned side by side.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub const fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
        }
    }

    /// The full source being scanned.
    pub const fn source(&self) -> &'a str {
        self.src
    }

    /// Scans the next token, skipping whitespace and `#` comments first.
    ///
    /// Once the input is exhausted this keeps returning [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Result<Token<'a>, ConfigError> {
        self.skip_trivia();

        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return Ok(Token {
                kind: TokenKind::Eof,
                lexeme: "",
                line: self.line,
                offset: self.pos,
            });
        }

        let Some((kind, len)) = match_candidate(rest) else {
            return Err(ConfigError::Lexical {
                line: self.line,
                fragment: line_fragment(self.src, self.pos).to_string(),
            });
        };

        let lexeme = &rest[..len];
        let token = Token {
            kind,
            lexeme,
            line: self.line,
            offset: self.pos,
        };
        self.pos += len;
        self.line += count_newlines(lexeme);
        Ok(token)
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.src[self.pos..];
            let skipped = rest.len() - rest.trim_start().len();
            let skipped = if skipped > 0 {
                skipped
            } else if rest.starts_with('#') {
                rest.find('\n').map_or(rest.len(), |i| i + 1)
            } else {
                break;
            };
            self.line += count_newlines(&rest[..skipped]);
            self.pos += skipped;
        }
    }
}

/// Returns the kind and byte length of the first candidate matching at the
/// start of `rest`.
fn match_candidate(rest: &str) -> Option<(TokenKind, usize)> {
    LITERALS
        .iter()
        .find(|(literal, _)| rest.starts_with(literal))
        .map(|(literal, kind)| (*kind, literal.len()))
        .or_else(|| {
            PATTERNS
                .iter()
                .find_map(|(kind, re)| re.find(rest).map(|m| (*kind, m.end())))
        })
}

/// The remainder of the line starting at `offset`, used to quote the offending
/// source in diagnostics.
pub(crate) fn line_fragment(src: &str, offset: usize) -> &str {
    let rest = &src[offset..];
    rest.find('\n').map_or(rest, |end| &rest[..end])
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

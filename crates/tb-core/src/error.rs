//! Errors raised while reading allotment configuration.

use thiserror::Error;

use crate::document::TagKey;
use crate::token::TokenKind;

/// A fatal problem in allotment source text.
///
/// Every variant carries the 1-based line it was detected on. Parsing stops
/// at the first error; no partial document is ever produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No token pattern matches at the current position.
    #[error("line {line}: unrecognized token type: {fragment}")]
    Lexical { line: usize, fragment: String },

    /// The lookahead token does not fit the grammar.
    #[error("line {line}: expected {expected}, but found {found}: {fragment}")]
    Syntax {
        expected: TokenKind,
        found: TokenKind,
        line: usize,
        fragment: String,
    },

    /// A tag key has more than one top-level block.
    #[error("line {line}: more than one block found for tag {tag}")]
    DuplicateTag { tag: String, line: usize },

    /// A literal is well formed but does not denote a value, e.g. `2024-02-30`
    /// or an hour count too large to represent.
    #[error("line {line}: invalid literal {lexeme:?}")]
    InvalidLiteral { line: usize, lexeme: String },
}

impl ConfigError {
    /// Line the error was detected on.
    pub const fn line(&self) -> usize {
        match self {
            Self::Lexical { line, .. }
            | Self::Syntax { line, .. }
            | Self::DuplicateTag { line, .. }
            | Self::InvalidLiteral { line, .. } => *line,
        }
    }
}

/// An accumulated duration left the range chrono can represent.
///
/// Reachable only through enormous hour literals or interval lists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("accumulated time for {tag} is out of range")]
pub struct OverflowError {
    pub tag: TagKey,
}

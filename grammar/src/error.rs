use std::fmt::{self, Display};

use thiserror::Error;

/// Why a line of either DSL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    MissingAssign,
    MissingQuote,
    UnterminatedQuote,
    InvalidName,
    MalformedSeparators,
    TrailingText,
    MissingArrow,
    DanglingAlternative,
    EmptyAlternative,
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Reason::MissingAssign => write!(f, "missing `:=`"),
            Reason::MissingQuote => write!(f, "pattern must be double quoted"),
            Reason::UnterminatedQuote => write!(f, "unterminated quote"),
            Reason::InvalidName => write!(f, "rule names must be uppercase identifiers"),
            Reason::MalformedSeparators => write!(f, "malformed separator list"),
            Reason::TrailingText => write!(f, "unexpected text after the pattern"),
            Reason::MissingArrow => write!(f, "expected `NAME -> alternatives`"),
            Reason::DanglingAlternative => write!(f, "`|` continuation before any left-hand side"),
            Reason::EmptyAlternative => write!(f, "empty alternative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("lexer spec line {line}: {reason}: `{text}`")]
    Lexer {
        line: usize,
        text: String,
        reason: Reason,
    },
    #[error("grammar spec line {line}: {reason}: `{text}`")]
    Grammar {
        line: usize,
        text: String,
        reason: Reason,
    },
    #[error("unresolved symbol `{symbol}` in production `{production}` (line {line})")]
    UnresolvedSymbol {
        symbol: String,
        production: String,
        line: usize,
    },
    #[error("grammar declares no productions")]
    EmptyGrammar,
}

impl SpecError {
    /// Syntax errors come from a single malformed line; everything else is
    /// only detectable once the whole spec has been read.
    pub fn is_syntax(&self) -> bool {
        matches!(self, SpecError::Lexer { .. } | SpecError::Grammar { .. })
    }
}

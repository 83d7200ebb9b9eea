use std::fmt::{self, Display};

use thiserror::Error;

use crate::table::Strategy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("no lexical rule matches {character:?} at offset {offset}")]
    NoMatch { offset: usize, character: char },
    #[error("rule `{rule}` has an invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error("syntax error at offset {offset}: expected {}, found {found}", .expected.join(" or "))]
    Syntax {
        offset: usize,
        expected: Vec<String>,
        found: String,
    },
    #[error("parse tree deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lexical(LexError::NoMatch { offset, .. }) => *offset,
            ParseError::Lexical(LexError::InvalidPattern { .. }) => 0,
            ParseError::Syntax { offset, .. } => *offset,
            ParseError::TooDeep { offset, .. } => *offset,
        }
    }
}

/// One table cell claimed by more than one production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub nonterminal: String,
    pub lookahead: String,
    pub productions: Vec<String>,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} on {}: {}",
            self.nonterminal,
            self.lookahead,
            self.productions.join(" | ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismError {
    pub strategy: Strategy,
    pub conflicts: Vec<Conflict>,
}

impl Display for DeterminismError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "no deterministic strategy found for this grammar ({}, {} conflicts)",
            self.strategy,
            self.conflicts.len()
        )?;
        for conflict in &self.conflicts {
            write!(f, "\n  {}", conflict)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeterminismError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}`, expected `ll1` or `auto`")]
pub struct UnknownStrategy(pub String);

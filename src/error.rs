use codegen::EmitError;
use grammar::SpecError;
use parsegen::{DeterminismError, LexError, ParseError};
use thiserror::Error;

/// Any failure of a request. Cloneable so that one compile failure can be
/// reported on every channel that needed the compiled grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error(transparent)]
    Determinism(#[from] DeterminismError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Spec(e) if e.is_syntax() => "syntax",
            Error::Spec(_) => "semantic",
            Error::Lexical(_) => "lexical",
            Error::Determinism(_) => "determinism",
            Error::Parse(_) => "parse",
            Error::Emit(_) => "emit",
            Error::Task(_) => "task",
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmitError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("`{0}` is not a valid parser name")]
    InvalidParserName(String),
    #[error("`{0}` is not a valid module path")]
    InvalidModule(String),
    #[error("`{0}` clashes with an item of the generated module")]
    ReservedName(String),
    #[error("cannot emit a parser from a table with {0} conflicts")]
    Nondeterministic(usize),
    #[error("lexical rule `{0}` produces a terminal the grammar does not declare")]
    UnknownTerminal(String),
}

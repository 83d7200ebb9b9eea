//! Runtime side of the generator: the tokenizer, grammar analysis, the
//! prediction table and the predictive parser built on top of them.
mod analysis;
mod error;
mod lexer;
mod parser;
mod position;
mod span;
mod state;
mod table;
mod tokens;
mod tree;
mod validate;

#[cfg(test)]
mod testing;

pub use analysis::{Analysis, AnalysisDisplay, FirstSet, Lookahead};
pub use error::{Conflict, DeterminismError, LexError, ParseError, UnknownStrategy};
pub use lexer::{Scanner, Tokenizer};
pub use parser::PredictiveParser;
pub use span::Span;
pub use state::{drive, Action, Entry, Recorder};
pub use table::{select, Cell, PredictionTable, Strategy, TableDisplay};
pub use tokens::{Lexeme, Token};
pub use tree::{ParseNode, TreeBuilder, DEFAULT_MAX_DEPTH};
pub use validate::{Step, Validation, Validator};

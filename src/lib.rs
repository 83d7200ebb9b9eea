//! LL(1) parser generator.
//!
//! A request carries a lexer spec and a grammar spec in their text forms.
//! `engine::run` compiles both and produces any of: the source of a
//! standalone parser, a token table, a parse tree, and a validation trace
//! for a sample input.
//!
//! ```
//! use llgen::{Compiled, Settings};
//!
//! let lexer = "% \" \"\nTERMINAL := \"\\(\"\nTERMINAL := \"\\)\"";
//! let settings = Settings::default();
//! let compiled = Compiled::from_text(
//!     lexer,
//!     "S -> TS | eps\nT -> (S)",
//!     settings.strategy,
//!     &settings.options(),
//! )
//! .unwrap();
//! assert!(compiled.validate("(())").accepted);
//! assert!(!compiled.validate("(()").accepted);
//! ```
pub mod config;
pub mod engine;
mod error;
pub mod tokentable;

pub use config::{ConfigError, Settings};
pub use engine::{compile, lint, run, Compiled, Lexer, Request, Response};
pub use error::Error;
pub use tokentable::TokenTable;

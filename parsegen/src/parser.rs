use grammar::Grammar;

use crate::error::ParseError;
use crate::lexer::Tokenizer;
use crate::state::drive;
use crate::table::PredictionTable;
use crate::tree::{ParseNode, TreeBuilder, DEFAULT_MAX_DEPTH};

/// Table-driven LL(1) parser producing concrete parse trees.
#[derive(Debug, Clone, Copy)]
pub struct PredictiveParser<'a> {
    grammar: &'a Grammar,
    table: &'a PredictionTable,
    tokenizer: &'a Tokenizer,
    max_depth: usize,
}

impl<'a> PredictiveParser<'a> {
    /// The table must be conflict-free; conflicting cells never predict.
    pub fn new(grammar: &'a Grammar, table: &'a PredictionTable, tokenizer: &'a Tokenizer) -> Self {
        PredictiveParser {
            grammar,
            table,
            tokenizer,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject inputs whose tree would be deeper than `max_depth` levels.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self, input: &str) -> Result<ParseNode, ParseError> {
        let mut builder = TreeBuilder::new(self.grammar, self.max_depth);
        drive(self.grammar, self.table, self.tokenizer.scan(input), &mut builder)?;
        let start = self.grammar.start();
        Ok(builder.finish().unwrap_or_else(|| ParseNode {
            name: self.grammar.nonterminal_name(start).to_owned(),
            symbol: grammar::Symbol::Nonterminal(start),
            text: None,
            children: Vec::new(),
        }))
    }
}

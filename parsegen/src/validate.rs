use std::fmt::{self, Display};

use grammar::{Grammar, NontermId, Production};
use serde::Serialize;

use crate::error::ParseError;
use crate::lexer::Tokenizer;
use crate::state::{drive, Action, Entry, Recorder};
use crate::table::PredictionTable;
use crate::tokens::{Lexeme, Token};

/// One move of the machine: the top of the stack before it, the lookahead,
/// and what was done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Entries on the stack, the end marker included.
    pub depth: usize,
    pub top: String,
    pub input: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub accepted: bool,
    pub trace: Vec<Step>,
    #[serde(skip)]
    pub error: Option<ParseError>,
}

impl Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let depth_width = self
            .trace
            .iter()
            .map(|s| s.depth.to_string().len())
            .max()
            .unwrap_or(0)
            .max(5);
        let top_width = self.trace.iter().map(|s| s.top.len()).max().unwrap_or(0).max(3);
        let input_width = self.trace.iter().map(|s| s.input.len()).max().unwrap_or(0).max(5);
        writeln!(
            f,
            "{:>dw$}  {:<tw$}  {:<iw$}  action",
            "depth",
            "top",
            "input",
            dw = depth_width,
            tw = top_width,
            iw = input_width
        )?;
        for step in &self.trace {
            writeln!(
                f,
                "{:>dw$}  {:<tw$}  {:<iw$}  {}",
                step.depth,
                step.top,
                step.input,
                step.action,
                dw = depth_width,
                tw = top_width,
                iw = input_width
            )?;
        }
        if self.accepted {
            writeln!(f, "accepted")
        } else {
            writeln!(f, "rejected")
        }
    }
}

struct Trace<'g> {
    grammar: &'g Grammar,
    steps: Vec<Step>,
}

impl<'g> Trace<'g> {
    fn top(&self, stack: &[Entry]) -> String {
        stack
            .last()
            .map(|entry| entry.label(self.grammar).to_owned())
            .unwrap_or_default()
    }
}

fn input(lexeme: &Lexeme) -> String {
    format!("{} at {}", lexeme.describe(), lexeme.offset())
}

impl<'g> Recorder for Trace<'g> {
    type Slot = ();

    fn root(&mut self, _start: NontermId) {}

    fn expand(
        &mut self,
        _parent: (),
        production: &Production,
        _lookahead: &Lexeme,
    ) -> Result<Vec<()>, ParseError> {
        Ok(vec![(); production.rhs.len()])
    }

    fn shift(&mut self, _slot: (), _token: &Token) {}

    fn step(&mut self, stack: &[Entry], lookahead: &Lexeme, action: Action) {
        let action = match action {
            Action::Shift => format!("match {}", lookahead.describe()),
            Action::Expand(id) => format!("predict {}", self.grammar.describe(id)),
            Action::Epsilon => format!("skip {}", self.grammar.empty_symbol()),
            Action::Accept => "accept".to_owned(),
        };
        let step = Step {
            depth: stack.len(),
            top: self.top(stack),
            input: input(lookahead),
            action,
        };
        log::trace!("{} {} | {} | {}", step.depth, step.top, step.input, step.action);
        self.steps.push(step);
    }

    fn reject(&mut self, stack: &[Entry], error: &ParseError) {
        self.steps.push(Step {
            depth: stack.len(),
            top: self.top(stack),
            input: format!("offset {}", error.offset()),
            action: format!("error: {}", error),
        });
    }
}

/// Runs the predictive machine for a verdict and a trace, without building
/// a tree.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    grammar: &'a Grammar,
    table: &'a PredictionTable,
    tokenizer: &'a Tokenizer,
}

impl<'a> Validator<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a PredictionTable, tokenizer: &'a Tokenizer) -> Self {
        Validator {
            grammar,
            table,
            tokenizer,
        }
    }

    pub fn validate(&self, input: &str) -> Validation {
        let mut trace = Trace {
            grammar: self.grammar,
            steps: Vec::new(),
        };
        let result = drive(self.grammar, self.table, self.tokenizer.scan(input), &mut trace);
        Validation {
            accepted: result.is_ok(),
            trace: trace.steps,
            error: result.err(),
        }
    }
}

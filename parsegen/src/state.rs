//! The predictive stack machine.
//!
//! A single driver runs every parse. What a parse produces is left to a
//! `Recorder`: the tree builder keeps nodes, the validator keeps a trace.
use grammar::{Grammar, NontermId, ProdId, Production, Symbol};

use crate::analysis::Lookahead;
use crate::error::{LexError, ParseError};
use crate::table::PredictionTable;
use crate::tokens::{Lexeme, Token};

/// An item on the parse stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    End,
    Symbol(Symbol),
}

impl Entry {
    pub fn label<'g>(&self, grammar: &'g Grammar) -> &'g str {
        match self {
            Entry::End => "<end>",
            Entry::Symbol(symbol) => grammar.symbol_name(*symbol),
        }
    }
}

/// A move of the machine, reported before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pop a terminal that matches the current token.
    Shift,
    /// Replace a nonterminal with the body of a production.
    Expand(ProdId),
    /// Pop the empty symbol.
    Epsilon,
    Accept,
}

pub trait Recorder {
    /// Handle on whatever the recorder keeps for one stack entry.
    type Slot: Copy;

    fn root(&mut self, start: NontermId) -> Self::Slot;

    /// Must return one slot per right-hand-side symbol, in order. An error
    /// rejects the input at `lookahead`.
    fn expand(
        &mut self,
        parent: Self::Slot,
        production: &Production,
        lookahead: &Lexeme,
    ) -> Result<Vec<Self::Slot>, ParseError>;

    fn shift(&mut self, slot: Self::Slot, token: &Token);

    fn epsilon(&mut self, _slot: Self::Slot) {}

    fn step(&mut self, _stack: &[Entry], _lookahead: &Lexeme, _action: Action) {}

    fn reject(&mut self, _stack: &[Entry], _error: &ParseError) {}
}

/// Run the machine over `lexemes`. The stack starts as `[End, start]`.
pub fn drive<R, I>(
    grammar: &Grammar,
    table: &PredictionTable,
    lexemes: I,
    recorder: &mut R,
) -> Result<(), ParseError>
where
    R: Recorder,
    I: IntoIterator<Item = Result<Lexeme, LexError>>,
{
    let root = recorder.root(grammar.start());
    let mut machine = Machine {
        grammar,
        table,
        stack: vec![Entry::End, Entry::Symbol(Symbol::Nonterminal(grammar.start()))],
        slots: vec![root, root],
    };
    let result = machine.run(lexemes.into_iter(), recorder);
    if let Err(error) = &result {
        log::debug!("parse rejected: {}", error);
        recorder.reject(&machine.stack, error);
    }
    result
}

struct Machine<'a, S> {
    grammar: &'a Grammar,
    table: &'a PredictionTable,
    stack: Vec<Entry>,
    slots: Vec<S>,
}

impl<'a, S: Copy> Machine<'a, S> {
    fn run<R, I>(&mut self, mut lexemes: I, recorder: &mut R) -> Result<(), ParseError>
    where
        R: Recorder<Slot = S>,
        I: Iterator<Item = Result<Lexeme, LexError>>,
    {
        let mut lookahead = advance(&mut lexemes)?;
        while let (Some(&entry), Some(&slot)) = (self.stack.last(), self.slots.last()) {
            let action = self.decide(entry, &lookahead)?;
            recorder.step(&self.stack, &lookahead, action);
            self.stack.pop();
            self.slots.pop();
            match action {
                Action::Accept => return Ok(()),
                Action::Epsilon => recorder.epsilon(slot),
                Action::Shift => {
                    if let Lexeme::Token(token) = &lookahead {
                        recorder.shift(slot, token);
                    }
                    lookahead = advance(&mut lexemes)?;
                }
                Action::Expand(id) => {
                    let production = self.grammar.production(id);
                    let children = recorder.expand(slot, production, &lookahead)?;
                    for (symbol, child) in production.rhs.iter().zip(children).rev() {
                        self.stack.push(Entry::Symbol(*symbol));
                        self.slots.push(child);
                    }
                }
            }
        }
        Ok(())
    }

    fn decide(&self, entry: Entry, lexeme: &Lexeme) -> Result<Action, ParseError> {
        let lookahead = match lexeme {
            Lexeme::End(_) => Some(Lookahead::End),
            Lexeme::Token(token) => self.grammar.terminal(&token.terminal).map(Lookahead::Term),
        };
        match entry {
            Entry::End if lookahead == Some(Lookahead::End) => Ok(Action::Accept),
            Entry::End => Err(self.syntax(&[Lookahead::End], lexeme)),
            Entry::Symbol(Symbol::Empty) => Ok(Action::Epsilon),
            Entry::Symbol(Symbol::Terminal(id)) => {
                if lookahead == Some(Lookahead::Term(id)) {
                    Ok(Action::Shift)
                } else {
                    Err(self.syntax(&[Lookahead::Term(id)], lexeme))
                }
            }
            Entry::Symbol(Symbol::Nonterminal(id)) => {
                match lookahead.and_then(|la| self.table.predict(id, la)) {
                    Some(production) => Ok(Action::Expand(production)),
                    None => Err(self.syntax(&self.table.expected(id), lexeme)),
                }
            }
        }
    }

    fn syntax(&self, expected: &[Lookahead], lexeme: &Lexeme) -> ParseError {
        ParseError::Syntax {
            offset: lexeme.offset(),
            expected: expected.iter().map(|la| la.describe(self.grammar)).collect(),
            found: lexeme.describe(),
        }
    }
}

fn advance<I>(lexemes: &mut I) -> Result<Lexeme, ParseError>
where
    I: Iterator<Item = Result<Lexeme, LexError>>,
{
    match lexemes.next() {
        Some(lexeme) => {
            let lexeme = lexeme?;
            log::trace!("lookahead {}", lexeme.describe());
            Ok(lexeme)
        }
        // Only reachable for streams without a trailing `End`.
        None => Ok(Lexeme::End(0)),
    }
}

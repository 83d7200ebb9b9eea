//! Lexer and grammar specifications, and the context-free grammar model they
//! compile into.
//!
//! Grammars are written in a small DSL:
//!
//! ```text
//! S -> TS | eps
//! T -> (S)
//! ```
//!
//! Symbols in a body may be written without spaces; they are split by
//! longest match against the declared nonterminals, the terminals of the
//! lexer spec and the empty-symbol spellings.
use std::collections::HashMap;
use std::fmt::{self, Display};

mod error;
pub mod lexspec;
pub mod parser;
mod resolve;

pub use error::{Reason, SpecError};
pub use lexspec::{LexRule, LexSpec, RuleKind};
pub use parser::{parse_grammar, Alternative, GrammarSpec, RuleDecl};
pub use resolve::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NontermId(pub usize);

/// Index of a production in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProdId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TermId),
    Nonterminal(NontermId),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: NontermId,
    /// Never empty. An epsilon production is `[Symbol::Empty]`.
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.rhs == [Symbol::Empty]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: Vec<String>,
    terminals: Vec<String>,
    productions: Vec<Production>,
    empty: String,
    terminal_ids: HashMap<String, TermId>,
}

impl Grammar {
    pub(crate) fn new(empty: String) -> Self {
        Grammar {
            nonterminals: Vec::new(),
            terminals: Vec::new(),
            productions: Vec::new(),
            empty,
            terminal_ids: HashMap::new(),
        }
    }

    pub(crate) fn add_terminal(&mut self, name: String) -> TermId {
        if let Some(id) = self.terminal_ids.get(&name) {
            return *id;
        }
        let id = TermId(self.terminals.len());
        self.terminal_ids.insert(name.clone(), id);
        self.terminals.push(name);
        id
    }

    pub(crate) fn add_nonterminal(&mut self, name: String) -> NontermId {
        if let Some(id) = self.nonterminal(&name) {
            return id;
        }
        self.nonterminals.push(name);
        NontermId(self.nonterminals.len() - 1)
    }

    pub(crate) fn add_production(&mut self, lhs: NontermId, rhs: Vec<Symbol>) -> ProdId {
        self.productions.push(Production { lhs, rhs });
        ProdId(self.productions.len() - 1)
    }

    /// The first declared nonterminal.
    pub fn start(&self) -> NontermId {
        NontermId(0)
    }

    pub fn terminal(&self, name: &str) -> Option<TermId> {
        self.terminal_ids.get(name).copied()
    }

    pub fn nonterminal(&self, name: &str) -> Option<NontermId> {
        self.nonterminals.iter().position(|n| n == name).map(NontermId)
    }

    pub fn terminal_name(&self, id: TermId) -> &str {
        &self.terminals[id.0]
    }

    pub fn nonterminal_name(&self, id: NontermId) -> &str {
        &self.nonterminals[id.0]
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(id) => self.terminal_name(id),
            Symbol::Nonterminal(id) => self.nonterminal_name(id),
            Symbol::Empty => &self.empty,
        }
    }

    /// Display spelling of the empty symbol.
    pub fn empty_symbol(&self) -> &str {
        &self.empty
    }

    pub fn terminals(&self) -> impl Iterator<Item = (TermId, &str)> {
        self.terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (TermId(i), name.as_str()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NontermId, &str)> {
        self.nonterminals
            .iter()
            .enumerate()
            .map(|(i, name)| (NontermId(i), name.as_str()))
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> &Production {
        &self.productions[id.0]
    }

    pub fn productions_of(&self, lhs: NontermId) -> impl Iterator<Item = (ProdId, &Production)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.lhs == lhs)
            .map(|(i, p)| (ProdId(i), p))
    }

    /// A production as `A -> x y z`, with bare symbol names.
    pub fn describe(&self, id: ProdId) -> String {
        let production = self.production(id);
        let body: Vec<&str> = production.rhs.iter().map(|s| self.symbol_name(*s)).collect();
        format!("{} -> {}", self.nonterminal_name(production.lhs), body.join(" "))
    }

    fn write_symbol(&self, f: &mut fmt::Formatter, symbol: Symbol) -> fmt::Result {
        match symbol {
            Symbol::Terminal(id) => {
                let name = self.terminal_name(id).replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\"", name)
            }
            other => write!(f, "{}", self.symbol_name(other)),
        }
    }
}

/// Writes the grammar back in DSL form, one line per nonterminal and every
/// terminal quoted, so the output resolves to the same grammar against the
/// same lexer spec.
impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, name) in self.nonterminals() {
            write!(f, "{} ->", name)?;
            for (n, (_, production)) in self.productions_of(id).enumerate() {
                if n > 0 {
                    write!(f, " |")?;
                }
                for symbol in &production.rhs {
                    write!(f, " ")?;
                    self.write_symbol(f, *symbol)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

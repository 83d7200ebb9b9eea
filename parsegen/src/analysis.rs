//! FIRST and FOLLOW sets.
use std::collections::BTreeSet;
use std::fmt::{self, Display};

use grammar::{Grammar, NontermId, Symbol, TermId};

/// Something the parser can see next: a terminal or the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
    Term(TermId),
    End,
}

impl Lookahead {
    /// Short label used in tables and traces.
    pub fn label<'g>(&self, grammar: &'g Grammar) -> &'g str {
        match self {
            Lookahead::Term(id) => grammar.terminal_name(*id),
            Lookahead::End => "<end>",
        }
    }

    /// How the lookahead reads in diagnostics.
    pub fn describe(&self, grammar: &Grammar) -> String {
        match self {
            Lookahead::Term(id) => format!("`{}`", grammar.terminal_name(*id)),
            Lookahead::End => "end of input".to_owned(),
        }
    }
}

/// FIRST set of a symbol or sequence. `nullable` stands in for the empty
/// symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terms: BTreeSet<TermId>,
    pub nullable: bool,
}

impl FirstSet {
    /// Merge `other` into `self`, returning whether anything was added.
    fn union(&mut self, other: &FirstSet) -> bool {
        let before = (self.terms.len(), self.nullable);
        self.terms.extend(other.terms.iter().copied());
        self.nullable |= other.nullable;
        before != (self.terms.len(), self.nullable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    first: Vec<FirstSet>,
    follow: Vec<BTreeSet<Lookahead>>,
}

impl Analysis {
    pub fn new(grammar: &Grammar) -> Self {
        let first = first_sets(grammar);
        let follow = follow_sets(grammar, &first);
        Analysis { first, follow }
    }

    pub fn first(&self, nonterminal: NontermId) -> &FirstSet {
        &self.first[nonterminal.0]
    }

    pub fn follow(&self, nonterminal: NontermId) -> &BTreeSet<Lookahead> {
        &self.follow[nonterminal.0]
    }

    /// FIRST of a sequence of symbols. The empty sequence is nullable.
    pub fn first_of(&self, symbols: &[Symbol]) -> FirstSet {
        sequence_first(&self.first, symbols)
    }

    /// Renders `FIRST(A) = {...}` then `FOLLOW(A) = {...}` for every
    /// nonterminal, in declaration order.
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> AnalysisDisplay<'a> {
        AnalysisDisplay {
            analysis: self,
            grammar,
        }
    }
}

pub struct AnalysisDisplay<'a> {
    analysis: &'a Analysis,
    grammar: &'a Grammar,
}

impl<'a> Display for AnalysisDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, name) in self.grammar.nonterminals() {
            let first = self.analysis.first(id);
            let mut labels: Vec<&str> = first
                .terms
                .iter()
                .map(|t| self.grammar.terminal_name(*t))
                .collect();
            if first.nullable {
                labels.push(self.grammar.empty_symbol());
            }
            writeln!(f, "FIRST({}) = {{{}}}", name, labels.join(", "))?;
        }
        for (id, name) in self.grammar.nonterminals() {
            let labels: Vec<&str> = self
                .analysis
                .follow(id)
                .iter()
                .map(|la| la.label(self.grammar))
                .collect();
            writeln!(f, "FOLLOW({}) = {{{}}}", name, labels.join(", "))?;
        }
        Ok(())
    }
}

fn sequence_first(first: &[FirstSet], symbols: &[Symbol]) -> FirstSet {
    let mut out = FirstSet::default();
    for symbol in symbols {
        match *symbol {
            Symbol::Terminal(id) => {
                out.terms.insert(id);
                return out;
            }
            Symbol::Nonterminal(id) => {
                let set = &first[id.0];
                out.terms.extend(set.terms.iter().copied());
                if !set.nullable {
                    return out;
                }
            }
            Symbol::Empty => (),
        }
    }
    out.nullable = true;
    out
}

fn first_sets(grammar: &Grammar) -> Vec<FirstSet> {
    let mut first = vec![FirstSet::default(); grammar.nonterminal_count()];
    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for production in grammar.productions() {
            let body = sequence_first(&first, &production.rhs);
            changed |= first[production.lhs.0].union(&body);
        }
    }
    log::debug!("FIRST sets settled after {} rounds", rounds);
    first
}

fn follow_sets(grammar: &Grammar, first: &[FirstSet]) -> Vec<BTreeSet<Lookahead>> {
    let mut follow = vec![BTreeSet::new(); grammar.nonterminal_count()];
    follow[grammar.start().0].insert(Lookahead::End);
    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for production in grammar.productions() {
            for (i, symbol) in production.rhs.iter().enumerate() {
                let target = match symbol {
                    Symbol::Nonterminal(id) => id.0,
                    _ => continue,
                };
                let rest = sequence_first(first, &production.rhs[i + 1..]);
                let before = follow[target].len();
                follow[target].extend(rest.terms.iter().map(|id| Lookahead::Term(*id)));
                if rest.nullable && target != production.lhs.0 {
                    let inherited = follow[production.lhs.0].clone();
                    follow[target].extend(inherited);
                }
                changed |= follow[target].len() != before;
            }
        }
    }
    log::debug!("FOLLOW sets settled after {} rounds", rounds);
    follow
}

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use grammar::{Grammar, NontermId, ProdId, TermId};
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, Lookahead};
use crate::error::{Conflict, DeterminismError, UnknownStrategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Predict(ProdId),
    /// Every production that claimed the cell, in insertion order.
    Conflict(Vec<ProdId>),
}

/// LL(1) prediction table, keyed by nonterminal and lookahead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionTable {
    cells: BTreeMap<(NontermId, Lookahead), Cell>,
}

impl PredictionTable {
    pub fn build(grammar: &Grammar, analysis: &Analysis) -> Self {
        let mut table = PredictionTable::default();
        for (i, production) in grammar.productions().iter().enumerate() {
            let id = ProdId(i);
            let first = analysis.first_of(&production.rhs);
            for term in &first.terms {
                table.insert(production.lhs, Lookahead::Term(*term), id);
            }
            if first.nullable {
                for lookahead in analysis.follow(production.lhs) {
                    table.insert(production.lhs, *lookahead, id);
                }
            }
        }
        log::debug!(
            "prediction table: {} cells, {} conflicts",
            table.cells.len(),
            table.conflicts().count()
        );
        table
    }

    fn insert(&mut self, nonterminal: NontermId, lookahead: Lookahead, id: ProdId) {
        let mut entry = match self.cells.entry((nonterminal, lookahead)) {
            Entry::Vacant(entry) => {
                entry.insert(Cell::Predict(id));
                return;
            }
            Entry::Occupied(entry) => entry,
        };
        let next = match entry.get() {
            Cell::Predict(existing) if *existing == id => return,
            Cell::Predict(existing) => Cell::Conflict(vec![*existing, id]),
            Cell::Conflict(ids) if ids.contains(&id) => return,
            Cell::Conflict(ids) => {
                let mut ids = ids.clone();
                ids.push(id);
                Cell::Conflict(ids)
            }
        };
        entry.insert(next);
    }

    pub fn get(&self, nonterminal: NontermId, lookahead: Lookahead) -> Option<&Cell> {
        self.cells.get(&(nonterminal, lookahead))
    }

    /// The single production to expand, if the cell holds exactly one.
    pub fn predict(&self, nonterminal: NontermId, lookahead: Lookahead) -> Option<ProdId> {
        match self.get(nonterminal, lookahead) {
            Some(Cell::Predict(id)) => Some(*id),
            _ => None,
        }
    }

    /// Lookaheads with an entry in the row of `nonterminal`.
    pub fn expected(&self, nonterminal: NontermId) -> Vec<Lookahead> {
        self.row(nonterminal).map(|(lookahead, _)| lookahead).collect()
    }

    pub fn row(&self, nonterminal: NontermId) -> impl Iterator<Item = (Lookahead, &Cell)> {
        self.cells
            .range((nonterminal, Lookahead::Term(TermId(0)))..=(nonterminal, Lookahead::End))
            .map(|((_, lookahead), cell)| (*lookahead, cell))
    }

    pub fn entries(&self) -> impl Iterator<Item = (NontermId, Lookahead, &Cell)> {
        self.cells
            .iter()
            .map(|((nonterminal, lookahead), cell)| (*nonterminal, *lookahead, cell))
    }

    pub fn conflicts(&self) -> impl Iterator<Item = (NontermId, Lookahead, &[ProdId])> {
        self.entries().filter_map(|(nonterminal, lookahead, cell)| match cell {
            Cell::Conflict(ids) => Some((nonterminal, lookahead, ids.as_slice())),
            Cell::Predict(_) => None,
        })
    }

    pub fn is_deterministic(&self) -> bool {
        self.conflicts().next().is_none()
    }

    /// Renders one line per cell, `A, x => A -> ...`.
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> TableDisplay<'a> {
        TableDisplay {
            table: self,
            grammar,
        }
    }
}

pub struct TableDisplay<'a> {
    table: &'a PredictionTable,
    grammar: &'a Grammar,
}

impl<'a> Display for TableDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (nonterminal, lookahead, cell) in self.table.entries() {
            write!(
                f,
                "{}, {} => ",
                self.grammar.nonterminal_name(nonterminal),
                lookahead.label(self.grammar)
            )?;
            match cell {
                Cell::Predict(id) => writeln!(f, "{}", self.grammar.describe(*id))?,
                Cell::Conflict(ids) => {
                    let productions: Vec<String> =
                        ids.iter().map(|id| self.grammar.describe(*id)).collect();
                    writeln!(f, "conflict: {}", productions.join(" | "))?
                }
            }
        }
        Ok(())
    }
}

/// How to pick a parsing strategy for a grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Ll1,
    /// Try every deterministic strategy available, which is only LL(1).
    Auto,
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ll1" => Ok(Strategy::Ll1),
            "auto" => Ok(Strategy::Auto),
            _ => Err(UnknownStrategy(s.to_owned())),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strategy::Ll1 => write!(f, "ll1"),
            Strategy::Auto => write!(f, "auto"),
        }
    }
}

/// Analyze `grammar` and build a conflict-free table under `strategy`.
pub fn select(
    strategy: Strategy,
    grammar: &Grammar,
) -> Result<(Analysis, PredictionTable), DeterminismError> {
    let analysis = Analysis::new(grammar);
    let table = PredictionTable::build(grammar, &analysis);
    log::trace!("prediction table:\n{}", table.display(grammar));
    if table.is_deterministic() {
        return Ok((analysis, table));
    }
    if strategy == Strategy::Auto {
        log::debug!("auto: ll1 has conflicts and no other deterministic strategy applies");
    }
    let conflicts = table
        .conflicts()
        .map(|(nonterminal, lookahead, ids)| Conflict {
            nonterminal: grammar.nonterminal_name(nonterminal).to_owned(),
            lookahead: lookahead.describe(grammar),
            productions: ids.iter().map(|id| grammar.describe(*id)).collect(),
        })
        .collect();
    Err(DeterminismError {
        strategy,
        conflicts,
    })
}

use grammar::{Grammar, NontermId, Production, Symbol};
use serde::Serialize;

use crate::error::ParseError;
use crate::state::Recorder;
use crate::tokens::{Lexeme, Token};

/// Deepest tree the builder will produce. Trees are serialized and printed
/// recursively, so this bounds the stack those walks need.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// A node of a concrete parse tree. Leaves are named by the text they
/// matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseNode {
    pub name: String,
    #[serde(skip)]
    pub symbol: Symbol,
    #[serde(skip)]
    pub text: Option<String>,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Text of every matched leaf, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if let Some(text) = &node.text {
                out.push(text.as_str());
            }
            pending.extend(node.children.iter().rev());
        }
        out
    }

    /// Levels from this node down to its deepest leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

impl Drop for ParseNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[derive(Debug)]
struct Draft {
    name: String,
    symbol: Symbol,
    text: Option<String>,
    depth: usize,
    children: Vec<usize>,
}

/// Records expansions into an arena, then hands out an owned tree.
#[derive(Debug)]
pub struct TreeBuilder<'g> {
    grammar: &'g Grammar,
    max_depth: usize,
    nodes: Vec<Draft>,
}

impl<'g> TreeBuilder<'g> {
    pub fn new(grammar: &'g Grammar, max_depth: usize) -> Self {
        TreeBuilder {
            grammar,
            max_depth,
            nodes: Vec::new(),
        }
    }

    fn push(&mut self, symbol: Symbol, depth: usize) -> usize {
        self.nodes.push(Draft {
            name: self.grammar.symbol_name(symbol).to_owned(),
            symbol,
            text: None,
            depth,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Children are always pushed after their parent, so building from the
    /// back means every child is finished before it is needed.
    pub fn finish(self) -> Option<ParseNode> {
        let mut built: Vec<Option<ParseNode>> = Vec::new();
        built.resize_with(self.nodes.len(), || None);
        for (i, draft) in self.nodes.into_iter().enumerate().rev() {
            let children = draft
                .children
                .iter()
                .filter_map(|child| built[*child].take())
                .collect();
            built[i] = Some(ParseNode {
                name: draft.name,
                symbol: draft.symbol,
                text: draft.text,
                children,
            });
        }
        built.into_iter().next().flatten()
    }
}

impl<'g> Recorder for TreeBuilder<'g> {
    type Slot = Option<usize>;

    fn root(&mut self, start: NontermId) -> Self::Slot {
        Some(self.push(Symbol::Nonterminal(start), 1))
    }

    fn expand(
        &mut self,
        parent: Self::Slot,
        production: &Production,
        lookahead: &Lexeme,
    ) -> Result<Vec<Self::Slot>, ParseError> {
        let parent = match parent {
            Some(parent) => parent,
            None => return Ok(vec![None; production.rhs.len()]),
        };
        let depth = self.nodes[parent].depth + 1;
        if depth > self.max_depth && !production.is_epsilon() {
            return Err(ParseError::TooDeep {
                offset: lookahead.offset(),
                limit: self.max_depth,
            });
        }
        let mut slots = Vec::with_capacity(production.rhs.len());
        for symbol in &production.rhs {
            let slot = match symbol {
                Symbol::Empty => None,
                symbol => {
                    let child = self.push(*symbol, depth);
                    self.nodes[parent].children.push(child);
                    Some(child)
                }
            };
            slots.push(slot);
        }
        Ok(slots)
    }

    fn shift(&mut self, slot: Self::Slot, token: &Token) {
        if let Some(node) = slot.and_then(|i| self.nodes.get_mut(i)) {
            node.name = token.text.clone();
            node.text = Some(token.text.clone());
        }
    }
}

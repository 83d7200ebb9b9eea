use crate::error::SpecError;
use crate::lexspec::{LexSpec, RuleKind};
use crate::parser::{pieces, GrammarSpec, Piece};
use crate::{Grammar, NontermId, Symbol};

/// Knobs for resolving a grammar against a lexer spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Spellings of the empty symbol, in addition to any `EMPTY_SYMBOL`
    /// rules of the lexer spec.
    pub empty_symbols: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            empty_symbols: vec!["$".to_owned(), "eps".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Candidate {
    Declared(Symbol),
    /// A `NONTERMINAL` spelling that no left-hand side declares.
    Undeclared,
}

impl Candidate {
    fn rank(&self) -> u8 {
        match self {
            Candidate::Declared(Symbol::Nonterminal(_)) | Candidate::Undeclared => 0,
            Candidate::Declared(Symbol::Empty) => 1,
            Candidate::Declared(Symbol::Terminal(_)) => 2,
        }
    }
}

struct Vocabulary {
    candidates: Vec<(String, Candidate)>,
}

impl Vocabulary {
    fn new(grammar: &Grammar, lexspec: &LexSpec, empty: &[String]) -> Self {
        let mut candidates = Vec::new();
        for (id, name) in grammar.nonterminals() {
            candidates.push((name.to_owned(), Candidate::Declared(Symbol::Nonterminal(id))));
        }
        for spelling in lexspec.spellings(RuleKind::Nonterminal) {
            let candidate = match grammar.nonterminal(&spelling) {
                Some(id) => Candidate::Declared(Symbol::Nonterminal(id)),
                None => Candidate::Undeclared,
            };
            candidates.push((spelling, candidate));
        }
        for spelling in empty {
            candidates.push((spelling.clone(), Candidate::Declared(Symbol::Empty)));
        }
        for (id, name) in grammar.terminals() {
            candidates.push((name.to_owned(), Candidate::Declared(Symbol::Terminal(id))));
        }
        candidates.retain(|(spelling, _)| !spelling.is_empty());
        Vocabulary { candidates }
    }

    fn longest(&self, rest: &str) -> Option<(usize, Candidate)> {
        let mut best: Option<(usize, Candidate)> = None;
        for (spelling, candidate) in &self.candidates {
            if !rest.starts_with(spelling.as_str()) {
                continue;
            }
            let better = match best {
                None => true,
                Some((len, current)) => {
                    spelling.len() > len || (spelling.len() == len && candidate.rank() < current.rank())
                }
            };
            if better {
                best = Some((spelling.len(), *candidate));
            }
        }
        best
    }

    /// Resolve one alternative, returning the offending text on failure.
    fn scan(&self, grammar: &Grammar, text: &str) -> Result<Vec<Symbol>, String> {
        let mut symbols = Vec::new();
        for piece in pieces(text) {
            match piece {
                Piece::Literal(spelling) => match grammar.terminal(&spelling) {
                    Some(id) => symbols.push(Symbol::Terminal(id)),
                    None => return Err(format!("\"{}\"", spelling)),
                },
                Piece::Word(mut rest) => {
                    while !rest.is_empty() {
                        match self.longest(rest) {
                            Some((len, Candidate::Declared(symbol))) => {
                                symbols.push(symbol);
                                rest = &rest[len..];
                            }
                            Some((len, Candidate::Undeclared)) => return Err(rest[..len].to_owned()),
                            None => return Err(unmatched(rest).to_owned()),
                        }
                    }
                }
            }
        }
        Ok(symbols)
    }
}

/// The identifier run at the start of `rest`, or its first character.
fn unmatched(rest: &str) -> &str {
    let end = rest
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '\''))
        .map_or(rest.len(), |(i, _)| i);
    if end > 0 {
        return &rest[..end];
    }
    let first = rest.chars().next().map_or(0, char::len_utf8);
    &rest[..first]
}

/// Drop empty symbols from bodies that have anything else in them.
fn normalize(symbols: Vec<Symbol>, production: &str) -> Vec<Symbol> {
    let len = symbols.len();
    let body: Vec<Symbol> = symbols.into_iter().filter(|s| *s != Symbol::Empty).collect();
    if body.is_empty() {
        return vec![Symbol::Empty];
    }
    if body.len() != len {
        log::warn!("dropping empty symbol inside `{}`", production);
    }
    body
}

impl GrammarSpec {
    /// Intern every symbol of the grammar against the terminals, nonterminal
    /// spellings and empty spellings of `lexspec`.
    pub fn resolve(&self, lexspec: &LexSpec, options: &Options) -> Result<Grammar, SpecError> {
        if self.rules.is_empty() {
            return Err(SpecError::EmptyGrammar);
        }
        let empty: Vec<String> = lexspec
            .spellings(RuleKind::Empty)
            .chain(options.empty_symbols.iter().cloned())
            .filter(|s| !s.is_empty())
            .collect();
        let display = empty.first().cloned().unwrap_or_else(|| "$".to_owned());

        let mut grammar = Grammar::new(display);
        for name in lexspec.terminal_names() {
            grammar.add_terminal(name);
        }
        for rule in &self.rules {
            grammar.add_nonterminal(rule.lhs.clone());
        }

        let vocabulary = Vocabulary::new(&grammar, lexspec, &empty);
        for (index, rule) in self.rules.iter().enumerate() {
            for alternative in &rule.alternatives {
                let production = format!("{} -> {}", rule.lhs, alternative.text);
                let symbols = vocabulary
                    .scan(&grammar, &alternative.text)
                    .map_err(|symbol| SpecError::UnresolvedSymbol {
                        symbol,
                        production: production.clone(),
                        line: alternative.line,
                    })?;
                grammar.add_production(NontermId(index), normalize(symbols, &production));
            }
        }
        log::debug!(
            "resolved grammar: {} terminals, {} nonterminals, {} productions",
            grammar.terminal_count(),
            grammar.nonterminal_count(),
            grammar.productions().len()
        );
        Ok(grammar)
    }
}

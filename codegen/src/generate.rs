use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;

use grammar::{Grammar, LexSpec, Symbol};
use parsegen::{Cell, Lookahead, PredictionTable};

use crate::error::{EmitError, Result};

/// Type names the generated module already uses.
const RESERVED: &[&str] = &[
    "Token", "Node", "Error", "Symbol", "Result", "Option", "Vec", "String", "Some", "None", "Ok",
    "Err",
];

/// A lexical rule as it is written into the generated `RULES` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub name: String,
    /// Anchored pattern.
    pub pattern: String,
    /// `None` for separators.
    pub terminal: Option<usize>,
    pub priority: usize,
}

pub fn parser_ident(name: &str) -> Result<Ident> {
    let ident: Ident =
        syn::parse_str(name).map_err(|_| EmitError::InvalidParserName(name.to_owned()))?;
    if RESERVED.contains(&ident.to_string().as_str()) {
        return Err(EmitError::ReservedName(name.to_owned()));
    }
    Ok(ident)
}

/// Split `a::b` or `a.b` into identifiers. An empty path means no wrapper.
pub fn module_path(module: &str) -> Result<Vec<Ident>> {
    let module = module.trim();
    if module.is_empty() {
        return Ok(Vec::new());
    }
    module
        .split("::")
        .flat_map(|segment| segment.split('.'))
        .map(|segment| {
            syn::parse_str::<Ident>(segment).map_err(|_| EmitError::InvalidModule(module.to_owned()))
        })
        .collect()
}

pub fn rule_rows(grammar: &Grammar, lexspec: &LexSpec) -> Result<Vec<RuleRow>> {
    lexspec
        .rules
        .iter()
        .filter(|rule| rule.is_scanned())
        .map(|rule| {
            let terminal = match rule.terminal() {
                Some(name) => match grammar.terminal(&name) {
                    Some(id) => Some(id.0),
                    None => return Err(EmitError::UnknownTerminal(rule.name.clone())),
                },
                None => None,
            };
            Ok(RuleRow {
                name: rule.name.clone(),
                pattern: format!("^(?:{})", rule.pattern),
                terminal,
                priority: rule.priority,
            })
        })
        .collect()
}

fn index(i: usize) -> Literal {
    Literal::usize_unsuffixed(i)
}

fn symbol(symbol: &Symbol) -> TokenStream {
    match symbol {
        Symbol::Terminal(id) => {
            let id = index(id.0);
            quote!(Symbol::Terminal(#id))
        }
        Symbol::Nonterminal(id) => {
            let id = index(id.0);
            quote!(Symbol::Nonterminal(#id))
        }
        Symbol::Empty => quote!(Symbol::Empty),
    }
}

/// Generate the symbol, rule and production tables along with `predict`.
pub fn tables(grammar: &Grammar, rules: &[RuleRow], table: &PredictionTable) -> TokenStream {
    let terminals: Vec<&str> = grammar.terminals().map(|(_, name)| name).collect();
    let nonterminals: Vec<&str> = grammar.nonterminals().map(|(_, name)| name).collect();
    let start = index(grammar.start().0);
    let empty = grammar.empty_symbol();

    let rules = rules.iter().map(|row| {
        let name = &row.name;
        let pattern = &row.pattern;
        let priority = index(row.priority);
        let terminal = match row.terminal {
            Some(id) => {
                let id = index(id);
                quote!(Some(#id))
            }
            None => quote!(None),
        };
        quote! {
            (#name, #pattern, #terminal, #priority)
        }
    });

    let productions = grammar.productions().iter().map(|production| {
        let lhs = index(production.lhs.0);
        let body = production.rhs.iter().map(symbol);
        quote! {
            (#lhs, &[ #( #body ),* ])
        }
    });

    let predict = generate_predict(table);

    quote! {
        #[derive(Copy, Debug, Eq, Clone, PartialEq)]
        pub enum Symbol {
            Terminal(usize),
            Nonterminal(usize),
            Empty,
        }

        pub const TERMINALS: &[&str] = &[ #( #terminals ),* ];
        pub const NONTERMINALS: &[&str] = &[ #( #nonterminals ),* ];
        pub const START: usize = #start;
        #[allow(dead_code)]
        pub const EMPTY: &str = #empty;

        /// Lexical rules as `(name, pattern, terminal, priority)`. Separators
        /// have no terminal.
        pub const RULES: &[(&str, &str, Option<usize>, usize)] = &[ #( #rules ),* ];

        /// Productions as `(left-hand side, body)`.
        pub const PRODUCTIONS: &[(usize, &[Symbol])] = &[ #( #productions ),* ];

        #predict
    }
}

/// Generate the prediction function. Only conflict-free cells get an arm.
fn generate_predict(table: &PredictionTable) -> TokenStream {
    let arms = table
        .entries()
        .filter_map(|(nonterminal, lookahead, cell)| {
            let production = match cell {
                Cell::Predict(id) => index(id.0),
                Cell::Conflict(_) => return None,
            };
            let nonterminal = index(nonterminal.0);
            let lookahead = match lookahead {
                Lookahead::Term(id) => {
                    let id = index(id.0);
                    quote!(Some(#id))
                }
                Lookahead::End => quote!(None),
            };
            Some(quote! {
                (#nonterminal, #lookahead) => Some(#production),
            })
        });

    quote! {
        /// Production to expand for a nonterminal and lookahead terminal,
        /// with `None` standing for the end of input.
        pub fn predict(nonterminal: usize, lookahead: Option<usize>) -> Option<usize> {
            match (nonterminal, lookahead) {
                #( #arms )*
                _ => None,
            }
        }
    }
}

/// Generate the token, tree and error types and the parser itself.
pub fn runtime(name: &Ident) -> TokenStream {
    quote! {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct Token {
            pub terminal: usize,
            pub text: String,
            pub offset: usize,
        }

        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct Node {
            pub name: String,
            pub children: Vec<Node>,
        }

        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Error {
            Pattern(String),
            NoMatch { offset: usize, character: char },
            Syntax { offset: usize, expected: Vec<String>, found: String },
        }

        impl ::std::fmt::Display for Error {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                match self {
                    Error::Pattern(message) => write!(f, "invalid pattern: {}", message),
                    Error::NoMatch { offset, character } => {
                        write!(f, "no lexical rule matches {:?} at offset {}", character, offset)
                    }
                    Error::Syntax { offset, expected, found } => write!(
                        f,
                        "syntax error at offset {}: expected {}, found {}",
                        offset,
                        expected.join(" or "),
                        found
                    ),
                }
            }
        }

        impl ::std::error::Error for Error {}

        pub struct #name {
            rules: Vec<(::regex::Regex, Option<usize>, usize)>,
        }

        impl #name {
            pub fn new() -> Result<Self, Error> {
                let mut rules = Vec::with_capacity(RULES.len());
                for (_, pattern, terminal, priority) in RULES {
                    let regex = ::regex::Regex::new(pattern)
                        .map_err(|e| Error::Pattern(e.to_string()))?;
                    rules.push((regex, *terminal, *priority));
                }
                Ok(#name { rules })
            }

            /// Longest match wins. Equal lengths go to the lower priority,
            /// then to the earlier rule.
            pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, Error> {
                let mut tokens = Vec::new();
                let mut offset = 0;
                while offset < input.len() {
                    let rest = &input[offset..];
                    let mut best: Option<(usize, Option<usize>, usize)> = None;
                    for (regex, terminal, priority) in &self.rules {
                        let len = match regex.find(rest) {
                            Some(m) if m.end() > 0 => m.end(),
                            _ => continue,
                        };
                        let better = match best {
                            None => true,
                            Some((best_len, _, best_priority)) => {
                                len > best_len || (len == best_len && *priority < best_priority)
                            }
                        };
                        if better {
                            best = Some((len, *terminal, *priority));
                        }
                    }
                    match best {
                        Some((len, terminal, _)) => {
                            if let Some(terminal) = terminal {
                                tokens.push(Token {
                                    terminal,
                                    text: rest[..len].to_string(),
                                    offset,
                                });
                            }
                            offset += len;
                        }
                        None => {
                            let character = rest.chars().next().unwrap_or_default();
                            return Err(Error::NoMatch { offset, character });
                        }
                    }
                }
                Ok(tokens)
            }

            pub fn parse(&self, input: &str) -> Result<Node, Error> {
                let tokens = self.tokenize(input)?;
                let mut nodes: Vec<(String, Vec<usize>)> =
                    vec![(NONTERMINALS[START].to_string(), Vec::new())];
                let mut stack: Vec<(Option<Symbol>, usize)> =
                    vec![(None, 0), (Some(Symbol::Nonterminal(START)), 0)];
                let mut position = 0;
                while let Some((top, slot)) = stack.pop() {
                    let lookahead = tokens.get(position);
                    let offset = lookahead.map_or(input.len(), |token| token.offset);
                    match top {
                        None => {
                            return match lookahead {
                                None => Ok(build(nodes)),
                                Some(_) => Err(syntax(
                                    vec!["end of input".to_string()],
                                    lookahead,
                                    offset,
                                )),
                            };
                        }
                        Some(Symbol::Empty) => {}
                        Some(Symbol::Terminal(terminal)) => match lookahead {
                            Some(token) if token.terminal == terminal => {
                                nodes[slot].0 = token.text.clone();
                                position += 1;
                            }
                            _ => {
                                let expected = vec![format!("`{}`", TERMINALS[terminal])];
                                return Err(syntax(expected, lookahead, offset));
                            }
                        },
                        Some(Symbol::Nonterminal(nonterminal)) => {
                            let terminal = lookahead.map(|token| token.terminal);
                            let production = match predict(nonterminal, terminal) {
                                Some(production) => production,
                                None => {
                                    return Err(syntax(expected(nonterminal), lookahead, offset))
                                }
                            };
                            let (_, body) = PRODUCTIONS[production];
                            let mut children = Vec::with_capacity(body.len());
                            for symbol in body {
                                let child = match *symbol {
                                    Symbol::Empty => 0,
                                    Symbol::Terminal(id) => attach(&mut nodes, slot, TERMINALS[id]),
                                    Symbol::Nonterminal(id) => {
                                        attach(&mut nodes, slot, NONTERMINALS[id])
                                    }
                                };
                                children.push((Some(*symbol), child));
                            }
                            stack.extend(children.into_iter().rev());
                        }
                    }
                }
                Ok(build(nodes))
            }
        }

        fn attach(nodes: &mut Vec<(String, Vec<usize>)>, parent: usize, name: &str) -> usize {
            nodes.push((name.to_string(), Vec::new()));
            let child = nodes.len() - 1;
            nodes[parent].1.push(child);
            child
        }

        fn expected(nonterminal: usize) -> Vec<String> {
            let mut out: Vec<String> = (0..TERMINALS.len())
                .filter(|terminal| predict(nonterminal, Some(*terminal)).is_some())
                .map(|terminal| format!("`{}`", TERMINALS[terminal]))
                .collect();
            if predict(nonterminal, None).is_some() {
                out.push("end of input".to_string());
            }
            out
        }

        fn syntax(expected: Vec<String>, lookahead: Option<&Token>, offset: usize) -> Error {
            let found = match lookahead {
                Some(token) => format!("`{}`", token.text),
                None => "end of input".to_string(),
            };
            Error::Syntax { offset, expected, found }
        }

        fn build(nodes: Vec<(String, Vec<usize>)>) -> Node {
            let mut built: Vec<Option<Node>> = Vec::with_capacity(nodes.len());
            built.resize_with(nodes.len(), || None);
            for (i, (name, children)) in nodes.into_iter().enumerate().rev() {
                let children = children
                    .iter()
                    .filter_map(|child| built[*child].take())
                    .collect();
                built[i] = Some(Node { name, children });
            }
            built
                .into_iter()
                .next()
                .flatten()
                .unwrap_or(Node { name: String::new(), children: Vec::new() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::{GrammarSpec, Options};
    use parsegen::{select, Strategy};
    use proc_macro2::Span;

    const LEX: &str = r#"%" "
TERMINAL := "a"
TERMINAL := "b"
"#;

    fn compile(text: &str) -> (Grammar, LexSpec, PredictionTable) {
        let lexspec: LexSpec = LEX.parse().unwrap();
        let spec: GrammarSpec = text.parse().unwrap();
        let grammar = spec.resolve(&lexspec, &Options::default()).unwrap();
        let (_, table) = select(Strategy::Ll1, &grammar).unwrap();
        (grammar, lexspec, table)
    }

    #[test]
    fn predict_function() {
        let (_, _, table) = compile("S -> a S | b");
        let expected = quote! {
            /// Production to expand for a nonterminal and lookahead terminal,
            /// with `None` standing for the end of input.
            pub fn predict(nonterminal: usize, lookahead: Option<usize>) -> Option<usize> {
                match (nonterminal, lookahead) {
                    (0, Some(0)) => Some(0),
                    (0, Some(1)) => Some(1),
                    _ => None,
                }
            }
        };
        assert_eq!(expected.to_string(), generate_predict(&table).to_string());
    }

    #[test]
    fn rule_rows_are_anchored() {
        let (grammar, lexspec, _) = compile("S -> a S | eps");
        let rows = rule_rows(&grammar, &lexspec).unwrap();
        assert_eq!(
            vec![
                RuleRow {
                    name: "TERMINAL".to_owned(),
                    pattern: "^(?:a)".to_owned(),
                    terminal: Some(0),
                    priority: 1,
                },
                RuleRow {
                    name: "TERMINAL".to_owned(),
                    pattern: "^(?:b)".to_owned(),
                    terminal: Some(1),
                    priority: 2,
                },
                RuleRow {
                    name: "IGNORE".to_owned(),
                    pattern: "^(?: )".to_owned(),
                    terminal: None,
                    priority: 3,
                },
            ],
            rows
        );
    }

    #[test]
    fn production_table() {
        let (grammar, lexspec, table) = compile("S -> a S | eps");
        let rows = rule_rows(&grammar, &lexspec).unwrap();
        let ts = tables(&grammar, &rows, &table).to_string();
        let expected = quote! {
            pub const PRODUCTIONS: &[(usize, &[Symbol])] = &[
                (0, &[Symbol::Terminal(0), Symbol::Nonterminal(0)]),
                (0, &[Symbol::Empty])
            ];
        };
        assert!(ts.contains(&expected.to_string()), "tables: {}", ts);
    }

    #[test]
    fn unknown_terminal() {
        let (grammar, _, _) = compile("S -> a");
        let other: LexSpec = "NUM := \"[0-9]+\"".parse().unwrap();
        assert_eq!(
            Err(EmitError::UnknownTerminal("NUM".to_owned())),
            rule_rows(&grammar, &other)
        );
    }

    #[test]
    fn names() {
        assert_eq!(
            Ident::new("Calc", Span::call_site()),
            parser_ident("Calc").unwrap()
        );
        assert_eq!(
            Err(EmitError::InvalidParserName("my parser".to_owned())),
            parser_ident("my parser")
        );
        assert_eq!(
            Err(EmitError::InvalidParserName("fn".to_owned())),
            parser_ident("fn")
        );
        assert_eq!(
            Err(EmitError::ReservedName("Token".to_owned())),
            parser_ident("Token")
        );

        let path: Vec<String> = module_path("a::b.c")
            .unwrap()
            .iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(vec!["a", "b", "c"], path);
        assert!(module_path("  ").unwrap().is_empty());
        assert_eq!(
            Err(EmitError::InvalidModule("a..b".to_owned())),
            module_path("a..b")
        );
    }
}

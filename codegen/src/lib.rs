//! Emits a standalone Rust parser module from a compiled grammar.
//!
//! The emitted unit only depends on the `regex` crate. It carries the
//! symbol tables, the lexical rules, the productions and a `predict` match,
//! plus a parser struct that tokenizes and parses the same way `parsegen`
//! does.
mod error;
mod generate;

use grammar::{Grammar, LexSpec};
use parsegen::PredictionTable;
use proc_macro2::{Ident, TokenStream};

pub use error::{EmitError, Result};
pub use generate::{module_path, parser_ident, RuleRow};

use generate::{rule_rows, runtime, tables};

const HEADER: &str = "// Generated by llgen. Do not edit.\n\n";

const INDENT: &str = "    ";

/// Pretty-print a run of items, indented `depth` levels.
fn render(tokens: TokenStream, depth: usize) -> String {
    let text = match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(e) => {
            log::warn!("emitting unformatted fragment: {}", e);
            format!("{}\n", tokens)
        }
    };
    if depth == 0 {
        return text;
    }
    let pad = INDENT.repeat(depth);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_owned()
            } else {
                format!("{}{}\n", pad, line)
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Open(usize),
    Tables,
    Runtime,
    Close,
    Done,
}

/// Source text of an emitted parser, one fragment at a time.
///
/// Module wrappers open before the tables and every closing brace is
/// flushed by the final fragment.
pub struct Fragments<'a> {
    grammar: &'a Grammar,
    table: &'a PredictionTable,
    rules: Vec<RuleRow>,
    name: Ident,
    modules: Vec<Ident>,
    stage: Stage,
}

impl<'a> Fragments<'a> {
    fn after_header(&self) -> Stage {
        if self.modules.is_empty() {
            Stage::Tables
        } else {
            Stage::Open(0)
        }
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let (fragment, next) = match self.stage {
            Stage::Done => return None,
            Stage::Header => (HEADER.to_owned(), self.after_header()),
            Stage::Open(i) => {
                let next = if i + 1 < self.modules.len() {
                    Stage::Open(i + 1)
                } else {
                    Stage::Tables
                };
                (
                    format!("{}pub mod {} {{\n", INDENT.repeat(i), self.modules[i]),
                    next,
                )
            }
            Stage::Tables => {
                let ts = tables(self.grammar, &self.rules, self.table);
                (format!("{}\n", render(ts, self.modules.len())), Stage::Runtime)
            }
            Stage::Runtime => {
                let next = if self.modules.is_empty() {
                    Stage::Done
                } else {
                    Stage::Close
                };
                (render(runtime(&self.name), self.modules.len()), next)
            }
            Stage::Close => {
                let closing = (0..self.modules.len())
                    .rev()
                    .map(|depth| format!("{}}}\n", INDENT.repeat(depth)))
                    .collect();
                (closing, Stage::Done)
            }
        };
        self.stage = next;
        Some(fragment)
    }
}

/// Check the names and the table, then return the emitted source as a lazy
/// sequence of fragments.
pub fn emit<'a>(
    grammar: &'a Grammar,
    lexspec: &LexSpec,
    table: &'a PredictionTable,
    parser_name: &str,
    module: &str,
) -> Result<Fragments<'a>> {
    let name = parser_ident(parser_name)?;
    let modules = module_path(module)?;
    let conflicts = table.conflicts().count();
    if conflicts > 0 {
        return Err(EmitError::Nondeterministic(conflicts));
    }
    let rules = rule_rows(grammar, lexspec)?;
    log::debug!(
        "emitting parser {} ({} rules, {} productions, {} module levels)",
        name,
        rules.len(),
        grammar.productions().len(),
        modules.len()
    );
    Ok(Fragments {
        grammar,
        table,
        rules,
        name,
        modules,
        stage: Stage::Header,
    })
}

pub fn emit_to_string(
    grammar: &Grammar,
    lexspec: &LexSpec,
    table: &PredictionTable,
    parser_name: &str,
    module: &str,
) -> Result<String> {
    Ok(emit(grammar, lexspec, table, parser_name, module)?.collect())
}

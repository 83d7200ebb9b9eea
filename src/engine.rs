//! Runs one request end to end.
//!
//! Both spec parsers run concurrently, then the grammar is resolved and
//! analysed, then the requested output channels run concurrently over the
//! shared compiled artifacts. Each channel reports its own result.
use std::sync::Arc;

use codegen::Fragments;
use grammar::{parse_grammar, Grammar, GrammarSpec, LexSpec, Options};
use parsegen::{
    select, Analysis, ParseNode, PredictionTable, PredictiveParser, Strategy, Tokenizer,
    Validation, Validator,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Settings;
use crate::error::Error;
use crate::tokentable::TokenTable;

/// What the caller wants done. Unset names and strategy fall back to the
/// settings; a missing sample input is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    pub lexer_text: String,
    pub grammar_text: String,
    pub parser_name: Option<String>,
    pub module_name: Option<String>,
    pub strategy: Option<Strategy>,
    pub want_parse_tree: bool,
    pub want_token_table: bool,
    pub want_validation: bool,
    pub sample_input: Option<String>,
}

/// A compiled lexer spec.
#[derive(Debug)]
pub struct Lexer {
    pub spec: LexSpec,
    pub tokenizer: Tokenizer,
}

impl Lexer {
    pub fn new(spec: LexSpec) -> Result<Self, Error> {
        let tokenizer = Tokenizer::new(&spec)?;
        Ok(Lexer { spec, tokenizer })
    }

    pub fn token_table(&self, input: &str) -> TokenTable {
        TokenTable::build(&self.spec, &self.tokenizer, input)
    }
}

/// Everything derived from one pair of specs.
#[derive(Debug)]
pub struct Compiled {
    pub lexer: Arc<Lexer>,
    pub grammar: Grammar,
    pub analysis: Analysis,
    pub table: PredictionTable,
}

impl Compiled {
    pub fn assemble(
        lexer: Arc<Lexer>,
        spec: &GrammarSpec,
        strategy: Strategy,
        options: &Options,
    ) -> Result<Self, Error> {
        let grammar = spec.resolve(&lexer.spec, options)?;
        let (analysis, table) = select(strategy, &grammar)?;
        log::debug!(
            "compiled {} nonterminals, {} terminals, {} productions",
            grammar.nonterminal_count(),
            grammar.terminal_count(),
            grammar.productions().len()
        );
        Ok(Compiled {
            lexer,
            grammar,
            analysis,
            table,
        })
    }

    /// Compile both specs on the current thread.
    pub fn from_text(
        lexer_text: &str,
        grammar_text: &str,
        strategy: Strategy,
        options: &Options,
    ) -> Result<Self, Error> {
        let lexer = Lexer::new(LexSpec::parse(lexer_text)?)?;
        let spec = parse_grammar(grammar_text)?;
        Compiled::assemble(Arc::new(lexer), &spec, strategy, options)
    }

    pub fn emit(&self, parser_name: &str, module: &str) -> Result<Fragments<'_>, Error> {
        let fragments = codegen::emit(
            &self.grammar,
            &self.lexer.spec,
            &self.table,
            parser_name,
            module,
        )?;
        Ok(fragments)
    }

    pub fn source(&self, parser_name: &str, module: &str) -> Result<String, Error> {
        Ok(self.emit(parser_name, module)?.collect())
    }

    pub fn parse(&self, input: &str) -> Result<ParseNode, Error> {
        let parser = PredictiveParser::new(&self.grammar, &self.table, &self.lexer.tokenizer);
        Ok(parser.parse(input)?)
    }

    pub fn validate(&self, input: &str) -> Validation {
        Validator::new(&self.grammar, &self.table, &self.lexer.tokenizer).validate(input)
    }
}

async fn blocking<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Parse both specs concurrently.
async fn parse_specs(
    lexer_text: String,
    grammar_text: String,
) -> (Result<Arc<Lexer>, Error>, Result<GrammarSpec, Error>) {
    let (lexer, spec) = tokio::join!(
        blocking(move || Lexer::new(LexSpec::parse(&lexer_text)?)),
        blocking(move || Ok(parse_grammar(&grammar_text)?)),
    );
    (lexer.map(Arc::new), spec)
}

async fn assemble(
    lexer: &Result<Arc<Lexer>, Error>,
    spec: Result<GrammarSpec, Error>,
    strategy: Strategy,
    options: Options,
) -> Result<Compiled, Error> {
    let lexer = lexer.clone()?;
    let spec = spec?;
    blocking(move || Compiled::assemble(lexer, &spec, strategy, &options)).await
}

/// Compile both specs, parsing them concurrently.
pub async fn compile(
    lexer_text: String,
    grammar_text: String,
    strategy: Strategy,
    options: Options,
) -> Result<Compiled, Error> {
    let (lexer, spec) = parse_specs(lexer_text, grammar_text).await;
    assemble(&lexer, spec, strategy, options).await
}

/// The outcome of a request, one independent result per channel. Channels
/// that were not asked for are `None`.
#[derive(Debug, Clone)]
pub struct Response {
    pub source: Result<String, Error>,
    pub token_table: Option<Result<TokenTable, Error>>,
    pub parse_tree: Option<Result<ParseNode, Error>>,
    pub validation: Option<Result<Validation, Error>>,
}

async fn channel<T, F>(
    wanted: bool,
    compiled: &Result<Arc<Compiled>, Error>,
    f: F,
) -> Option<Result<T, Error>>
where
    F: FnOnce(&Compiled) -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    if !wanted {
        return None;
    }
    let compiled = match compiled {
        Ok(compiled) => Arc::clone(compiled),
        Err(e) => return Some(Err(e.clone())),
    };
    Some(blocking(move || f(&compiled)).await)
}

pub async fn run(request: Request, settings: &Settings) -> Response {
    let strategy = request.strategy.unwrap_or(settings.strategy);
    let parser_name = request
        .parser_name
        .unwrap_or_else(|| settings.parser_name.clone());
    let module = request
        .module_name
        .unwrap_or_else(|| settings.module_name.clone());
    let input = request.sample_input.unwrap_or_default();
    let (want_tree, want_tokens, want_validation) = (
        request.want_parse_tree,
        request.want_token_table,
        request.want_validation,
    );

    let (lexer, spec) = parse_specs(request.lexer_text, request.grammar_text).await;
    let compiled = assemble(&lexer, spec, strategy, settings.options())
        .await
        .map(Arc::new);
    if let Err(e) = &compiled {
        log::debug!("request failed to compile: {}", e);
    }

    let tree_input = input.clone();
    let validation_input = input.clone();
    let source = async {
        let compiled = match &compiled {
            Ok(compiled) => Arc::clone(compiled),
            Err(e) => return Err(e.clone()),
        };
        blocking(move || compiled.source(&parser_name, &module)).await
    };
    let token_table = async {
        if !want_tokens {
            return None;
        }
        let lexer = match &lexer {
            Ok(lexer) => Arc::clone(lexer),
            Err(e) => return Some(Err(e.clone())),
        };
        Some(blocking(move || Ok(lexer.token_table(&input))).await)
    };

    let (source, token_table, parse_tree, validation) = tokio::join!(
        source,
        token_table,
        channel(want_tree, &compiled, move |c| c.parse(&tree_input)),
        channel(want_validation, &compiled, move |c| {
            Ok(c.validate(&validation_input))
        }),
    );

    Response {
        source,
        token_table,
        parse_tree,
        validation,
    }
}

fn error_json(e: &Error) -> Value {
    json!({
        "error": {
            "kind": e.kind(),
            "message": e.to_string(),
        }
    })
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        json!({
            "error": {
                "kind": "serialize",
                "message": e.to_string(),
            }
        })
    })
}

impl Response {
    /// Render every produced channel, failures as `{"error": {kind, message}}`.
    pub fn to_json(&self) -> Value {
        let mut out = serde_json::Map::new();
        let source = match &self.source {
            Ok(source) => Value::String(source.clone()),
            Err(e) => error_json(e),
        };
        out.insert("source".to_owned(), source);
        if let Some(result) = &self.token_table {
            let value = match result {
                Ok(table) => table.to_json(),
                Err(e) => error_json(e),
            };
            out.insert("tokenTable".to_owned(), value);
        }
        if let Some(result) = &self.parse_tree {
            let value = match result {
                Ok(tree) => to_value(tree),
                Err(e) => error_json(e),
            };
            out.insert("parseTree".to_owned(), value);
        }
        if let Some(result) = &self.validation {
            let value = match result {
                Ok(validation) => {
                    let mut value = to_value(validation);
                    if let Value::Object(map) = &mut value {
                        map.insert("text".to_owned(), Value::String(validation.to_string()));
                    }
                    value
                }
                Err(e) => error_json(e),
            };
            out.insert("validation".to_owned(), value);
        }
        Value::Object(out)
    }
}

/// Every problem in a pair of specs, without stopping at the first
/// malformed lexer line.
pub fn lint(lexer_text: &str, grammar_text: &str, options: &Options) -> Vec<Error> {
    let (lexspec, lexer_errors) = LexSpec::lint(lexer_text);
    let mut errors: Vec<Error> = lexer_errors.into_iter().map(Error::from).collect();
    if let Err(e) = Tokenizer::new(&lexspec) {
        errors.push(e.into());
    }
    match parse_grammar(grammar_text) {
        Ok(spec) if errors.is_empty() => {
            if let Err(e) = spec.resolve(&lexspec, options) {
                errors.push(e.into());
            }
        }
        Ok(_) => (),
        Err(e) => errors.push(e.into()),
    }
    errors
}

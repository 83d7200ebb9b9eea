//! Syntax phase of the grammar DSL. Nothing here knows about the lexer spec;
//! symbol resolution happens in `resolve`.
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, none_of, satisfy, space0, space1},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Reason, SpecError};
use crate::lexspec::{quoted, unescape};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub line: usize,
    pub text: String,
}

/// Every alternative declared for one left-hand side, across all lines that
/// name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub lhs: String,
    pub line: usize,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarSpec {
    pub rules: Vec<RuleDecl>,
}

impl GrammarSpec {
    fn declare(&mut self, lhs: &str, line: usize) -> usize {
        if let Some(index) = self.rules.iter().position(|rule| rule.lhs == lhs) {
            return index;
        }
        self.rules.push(RuleDecl {
            lhs: lhs.to_owned(),
            line,
            alternatives: Vec::new(),
        });
        self.rules.len() - 1
    }
}

impl FromStr for GrammarSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_grammar(s)
    }
}

pub fn parse_grammar(text: &str) -> Result<GrammarSpec, SpecError> {
    let mut spec = GrammarSpec::default();
    let mut current = None;
    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let error = |reason: Reason| SpecError::Grammar {
            line: number,
            text: raw.to_owned(),
            reason,
        };
        let (target, body) = match classify(raw).map_err(error)? {
            Line::Skip => continue,
            Line::Production(lhs, body) => (spec.declare(lhs, number), body),
            Line::Continuation(body) => match current {
                Some(target) => (target, body),
                None => return Err(error(Reason::DanglingAlternative)),
            },
        };
        current = Some(target);
        for text in split(body).map_err(error)? {
            spec.rules[target].alternatives.push(Alternative {
                line: number,
                text: text.to_owned(),
            });
        }
    }
    log::debug!("grammar spec: {} nonterminals", spec.rules.len());
    Ok(spec)
}

enum Line<'a> {
    Skip,
    Production(&'a str, &'a str),
    Continuation(&'a str),
}

fn classify(raw: &str) -> Result<Line<'_>, Reason> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Skip);
    }
    if let Ok((body, name)) = head(line) {
        return Ok(Line::Production(name, body));
    }
    match line.strip_prefix('|') {
        Some(body) => Ok(Line::Continuation(body)),
        None => Err(Reason::MissingArrow),
    }
}

fn split(body: &str) -> Result<Vec<&str>, Reason> {
    let (_, parts) = all_consuming(alternatives)(body).map_err(|_| Reason::UnterminatedQuote)?;
    let parts: Vec<&str> = parts.into_iter().map(str::trim).collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(Reason::EmptyAlternative);
    }
    Ok(parts)
}

/// A nonterminal name: uppercase letters and underscores, optionally primed.
pub fn nonterminal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        satisfy(|c| c.is_ascii_uppercase()),
        take_while(|c: char| c.is_ascii_uppercase() || c == '_'),
        opt(char('\'')),
    )))(input)
}

fn head(input: &str) -> IResult<&str, &str> {
    terminated(nonterminal, tuple((space0, tag("->"))))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(
        char('\''),
        recognize(many0(alt((preceded(char('\\'), anychar), none_of("\\'"))))),
        char('\''),
    )(input)
}

fn literal(input: &str) -> IResult<&str, &str> {
    alt((quoted, single_quoted))(input)
}

/// Text up to the next space, `|` or double quote. A `'` inside a word is
/// part of it, so primes never open a literal.
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '|' && c != '"')(input)
}

fn alternative(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((recognize(literal), word, space1))))(input)
}

fn alternatives(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(char('|'), alternative)(input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Literal(String),
    Word(&'a str),
}

/// Break one alternative into quoted literals and bare words.
pub(crate) fn pieces(text: &str) -> Vec<Piece<'_>> {
    let piece = alt((
        map(literal, |s| Piece::Literal(unescape(s))),
        map(word, Piece::Word),
    ));
    match many0(preceded(space0, piece))(text) {
        Ok((_, pieces)) => pieces,
        Err(_) => Vec::new(),
    }
}

//! The lexer DSL.
//!
//! ```text
//! # comment
//! %" ", "\t", "\n"
//! TERMINAL := "\("
//! NUMBER := "[0-9]+"
//! ```
use std::fmt::{self, Display};
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{anychar, char, none_of, satisfy, space0},
    combinator::{all_consuming, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::error::{Reason, SpecError};

/// Rules under this name contribute their spelling as a grammar terminal.
pub const TERMINAL: &str = "TERMINAL";
/// Rules under this name declare nonterminal spellings.
pub const NONTERMINAL: &str = "NONTERMINAL";
/// Rules under this name declare additional empty-symbol spellings.
pub const EMPTY_SYMBOL: &str = "EMPTY_SYMBOL";
/// Name given to every separator pattern declared on a `%` line.
pub const SEPARATOR: &str = "IGNORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Token,
    Terminal,
    Nonterminal,
    Empty,
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexRule {
    pub name: String,
    /// Regular expression text, exactly as written between the quotes.
    pub pattern: String,
    pub priority: usize,
    pub ignore: bool,
}

impl LexRule {
    pub fn kind(&self) -> RuleKind {
        if self.ignore {
            return RuleKind::Separator;
        }
        match self.name.as_str() {
            TERMINAL => RuleKind::Terminal,
            NONTERMINAL => RuleKind::Nonterminal,
            EMPTY_SYMBOL => RuleKind::Empty,
            _ => RuleKind::Token,
        }
    }

    /// The pattern with backslash escapes removed, so `\(` reads as `(`.
    pub fn spelling(&self) -> String {
        unescape(&self.pattern)
    }

    /// Name of the grammar terminal produced by this rule, if any.
    pub fn terminal(&self) -> Option<String> {
        match self.kind() {
            RuleKind::Terminal => Some(self.spelling()),
            RuleKind::Token => Some(self.name.clone()),
            _ => None,
        }
    }

    /// Whether the rule takes part in scanning sample input.
    pub fn is_scanned(&self) -> bool {
        matches!(
            self.kind(),
            RuleKind::Token | RuleKind::Terminal | RuleKind::Separator
        )
    }
}

impl Display for LexRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ignore {
            write!(f, "%\"{}\"", self.pattern)
        } else {
            write!(f, "{} := \"{}\"", self.name, self.pattern)
        }
    }
}

/// An ordered set of lexical rules. Separators always come last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexSpec {
    pub rules: Vec<LexRule>,
}

impl LexSpec {
    /// Parse lexer DSL text, stopping at the first malformed line.
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        let mut builder = Builder::default();
        for (index, raw) in text.lines().enumerate() {
            let line = classify(raw).map_err(|reason| SpecError::Lexer {
                line: index + 1,
                text: raw.to_owned(),
                reason,
            })?;
            builder.push(line);
        }
        Ok(builder.finish())
    }

    /// Parse every well-formed line and collect an error for each bad one.
    pub fn lint(text: &str) -> (Self, Vec<SpecError>) {
        let mut builder = Builder::default();
        let mut errors = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            match classify(raw) {
                Ok(line) => builder.push(line),
                Err(reason) => errors.push(SpecError::Lexer {
                    line: index + 1,
                    text: raw.to_owned(),
                    reason,
                }),
            }
        }
        (builder.finish(), errors)
    }

    pub fn rules(&self) -> &[LexRule] {
        &self.rules
    }

    /// Terminal names in rule order, without duplicates.
    pub fn terminal_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.rules.iter().filter_map(LexRule::terminal) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn spellings(&self, kind: RuleKind) -> impl Iterator<Item = String> + '_ {
        self.rules
            .iter()
            .filter(move |rule| rule.kind() == kind)
            .map(LexRule::spelling)
    }
}

impl FromStr for LexSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for LexSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separators: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| rule.ignore)
            .map(|rule| format!("\"{}\"", rule.pattern))
            .collect();
        if !separators.is_empty() {
            writeln!(f, "%{}", separators.join(", "))?;
        }
        for rule in self.rules.iter().filter(|rule| !rule.ignore) {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

enum Line<'a> {
    Skip,
    Separators(Vec<&'a str>),
    Rule(&'a str, &'a str),
}

#[derive(Default)]
struct Builder {
    rules: Vec<LexRule>,
    separators: Vec<String>,
}

impl Builder {
    fn push(&mut self, line: Line<'_>) {
        match line {
            Line::Skip => (),
            Line::Separators(patterns) => self
                .separators
                .extend(patterns.into_iter().map(str::to_owned)),
            Line::Rule(name, pattern) => {
                let priority = self.rules.len() + 1;
                self.rules.push(LexRule {
                    name: name.to_owned(),
                    pattern: pattern.to_owned(),
                    priority,
                    ignore: false,
                });
            }
        }
    }

    fn finish(self) -> LexSpec {
        let priority = self.rules.len() + 1;
        let mut rules = self.rules;
        rules.extend(self.separators.into_iter().map(|pattern| LexRule {
            name: SEPARATOR.to_owned(),
            pattern,
            priority,
            ignore: true,
        }));
        log::debug!("lexer spec: {} rules", rules.len());
        LexSpec { rules }
    }
}

fn classify(raw: &str) -> Result<Line<'_>, Reason> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Skip);
    }
    if line.starts_with('%') {
        return match all_consuming(terminated(separators, space0))(line) {
            Ok((_, patterns)) => Ok(Line::Separators(patterns)),
            Err(_) if unbalanced(line) => Err(Reason::UnterminatedQuote),
            Err(_) => Err(Reason::MalformedSeparators),
        };
    }
    match rule(line) {
        Ok((rest, (name, pattern))) if rest.trim().is_empty() => Ok(Line::Rule(name, pattern)),
        Ok(_) => Err(Reason::TrailingText),
        Err(_) => Err(diagnose(line)),
    }
}

fn diagnose(line: &str) -> Reason {
    let (name, pattern) = match line.split_once(":=") {
        Some(parts) => parts,
        None => return Reason::MissingAssign,
    };
    if all_consuming(rule_name)(name.trim()).is_err() {
        return Reason::InvalidName;
    }
    if !pattern.trim_start().starts_with('"') {
        return Reason::MissingQuote;
    }
    Reason::UnterminatedQuote
}

/// True when a double quote is left open at the end of the line.
fn unbalanced(line: &str) -> bool {
    let mut open = false;
    let mut escaped = false;
    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if open => escaped = true,
            '"' => open = !open,
            _ => (),
        }
    }
    open
}

pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

pub fn rule_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase()),
        take_while(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'),
    ))(input)
}

/// A double quoted string, returning the text between the quotes with its
/// escapes intact.
pub fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        recognize(many0(alt((
            preceded(char('\\'), anychar),
            none_of("\\\""),
        )))),
        char('"'),
    )(input)
}

fn separators(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        pair(char('%'), space0),
        separated_list1(tuple((space0, char(','), space0)), quoted),
    )(input)
}

fn rule(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(rule_name, tuple((space0, tag(":="), space0)), quoted)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCase<T> {
        input: &'static str,
        out: Result<T, Reason>,
    }

    fn assert_test_cases<T, F>(f: F, cases: Vec<TestCase<T>>)
    where
        T: std::fmt::Debug + PartialEq,
        F: Fn(&str) -> Result<T, Reason>,
    {
        for case in cases {
            assert_eq!(case.out, f(case.input), "input: {}", case.input);
        }
    }

    fn rule_of(input: &str) -> Result<(String, String), Reason> {
        match classify(input)? {
            Line::Rule(name, pattern) => Ok((name.to_owned(), pattern.to_owned())),
            _ => panic!("not a rule line: {}", input),
        }
    }

    #[test]
    fn test_quoted() {
        assert_eq!(Ok(("", "abc")), quoted("\"abc\""));
        assert_eq!(Ok((" rest", r#"a\"b"#)), quoted(r#""a\"b" rest"#));
        assert_eq!(Ok(("", "")), quoted("\"\""));
        assert!(quoted("\"abc").is_err());
        assert!(quoted(r#""abc\""#).is_err());
    }

    #[test]
    fn test_rule_lines() {
        let cases = vec![
            TestCase {
                input: r#"TERMINAL := "\(""#,
                out: Ok(("TERMINAL".to_owned(), r"\(".to_owned())),
            },
            TestCase {
                input: r#"  NUM_2:="[0-9]+"   "#,
                out: Ok(("NUM_2".to_owned(), "[0-9]+".to_owned())),
            },
            TestCase {
                input: r#"QUOTE := "\"""#,
                out: Ok(("QUOTE".to_owned(), r#"\""#.to_owned())),
            },
            TestCase {
                input: r#"lower := "a""#,
                out: Err(Reason::InvalidName),
            },
            TestCase {
                input: r#"Mixed := "a""#,
                out: Err(Reason::InvalidName),
            },
            TestCase {
                input: r#"NAME "a""#,
                out: Err(Reason::MissingAssign),
            },
            TestCase {
                input: r#"NAME := "abc"#,
                out: Err(Reason::UnterminatedQuote),
            },
            TestCase {
                input: "NAME := abc",
                out: Err(Reason::MissingQuote),
            },
            TestCase {
                input: r#"NAME := "a" b"#,
                out: Err(Reason::TrailingText),
            },
        ];
        assert_test_cases(rule_of, cases);
    }

    #[test]
    fn test_separator_lines() {
        let separators_of = |input: &str| -> Result<usize, Reason> {
            match classify(input)? {
                Line::Separators(patterns) => Ok(patterns.len()),
                _ => panic!("not a separator line: {}", input),
            }
        };
        let cases = vec![
            TestCase {
                input: r#"%" ", "\t", "\n""#,
                out: Ok(3),
            },
            TestCase {
                input: r#"% " ""#,
                out: Ok(1),
            },
            TestCase {
                input: r#"% " ", "\t"#,
                out: Err(Reason::UnterminatedQuote),
            },
            TestCase {
                input: r#"% " " "\t""#,
                out: Err(Reason::MalformedSeparators),
            },
            TestCase {
                input: "%",
                out: Err(Reason::MalformedSeparators),
            },
        ];
        assert_test_cases(separators_of, cases);
    }

    const PARENS: &str = r#"%" ", "\t", "\n", "\s", "\r"
TERMINAL := "\("
TERMINAL := "\)"
EMPTY_SYMBOL := "\$"
NONTERMINAL := "S"
NONTERMINAL := "T"
"#;

    #[test]
    fn separators_follow_rules() {
        let spec: LexSpec = PARENS.parse().unwrap();
        assert_eq!(10, spec.rules.len());
        let priorities: Vec<usize> = spec.rules.iter().map(|r| r.priority).collect();
        assert_eq!(vec![1, 2, 3, 4, 5, 6, 6, 6, 6, 6], priorities);
        assert!(spec.rules[5..].iter().all(|r| r.ignore && r.name == SEPARATOR));
        assert_eq!(RuleKind::Separator, spec.rules[9].kind());
    }

    #[test]
    fn rule_kinds_and_spellings() {
        let spec: LexSpec = PARENS.parse().unwrap();
        let kinds: Vec<RuleKind> = spec.rules[..5].iter().map(LexRule::kind).collect();
        assert_eq!(
            vec![
                RuleKind::Terminal,
                RuleKind::Terminal,
                RuleKind::Empty,
                RuleKind::Nonterminal,
                RuleKind::Nonterminal,
            ],
            kinds
        );
        assert_eq!("(", spec.rules[0].spelling());
        assert_eq!(vec!["(", ")"], spec.terminal_names());
        assert_eq!(vec!["$"], spec.spellings(RuleKind::Empty).collect::<Vec<_>>());
        assert!(!spec.rules[3].is_scanned());
        assert!(spec.rules[9].is_scanned());
    }

    #[test]
    fn token_rules_are_terminals_by_name() {
        let spec: LexSpec = "NUM := \"[0-9]+\"\nPLUS := \"\\+\"\nNUM := \"0x[0-9a-f]+\""
            .parse()
            .unwrap();
        assert_eq!(vec!["NUM", "PLUS"], spec.terminal_names());
    }

    #[test]
    fn comments_and_crlf() {
        let spec: LexSpec = "# numbers\r\nNUM := \"[0-9]+\"\r\n\r\n".parse().unwrap();
        assert_eq!(1, spec.rules.len());
        assert_eq!("[0-9]+", spec.rules[0].pattern);
    }

    #[test]
    fn first_error_halts() {
        let err = "A := \"a\"\nb := \"b\"\nC := \"c".parse::<LexSpec>().unwrap_err();
        assert_eq!(
            SpecError::Lexer {
                line: 2,
                text: "b := \"b\"".to_owned(),
                reason: Reason::InvalidName,
            },
            err
        );
    }

    #[test]
    fn lint_collects_every_error() {
        let (spec, errors) = LexSpec::lint("A := \"a\"\nb := \"b\"\nC := \"c\nD := \"d\"");
        let lines: Vec<usize> = errors
            .iter()
            .map(|e| match e {
                SpecError::Lexer { line, .. } => *line,
                other => panic!("unexpected error {:?}", other),
            })
            .collect();
        assert_eq!(vec![2, 3], lines);
        let names: Vec<&str> = spec.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(vec!["A", "D"], names);
        assert_eq!(2, spec.rules[1].priority);
    }

    #[test]
    fn lossless_display() {
        let spec: LexSpec = PARENS.parse().unwrap();
        let again: LexSpec = spec.to_string().parse().unwrap();
        assert_eq!(spec, again);
    }
}

use std::iter::FusedIterator;

use grammar::LexSpec;
use regex::Regex;

use crate::error::LexError;
use crate::position::Position;
use crate::span::Span;
use crate::tokens::{Lexeme, Token};

#[derive(Debug)]
struct Matcher {
    name: String,
    /// `None` for separators.
    terminal: Option<String>,
    priority: usize,
    regex: Regex,
}

/// Longest-match tokenizer compiled from a lexer spec.
#[derive(Debug)]
pub struct Tokenizer {
    matchers: Vec<Matcher>,
}

impl Tokenizer {
    pub fn new(spec: &LexSpec) -> Result<Self, LexError> {
        let mut matchers = Vec::new();
        for rule in spec.rules.iter().filter(|rule| rule.is_scanned()) {
            let regex = Regex::new(&format!("^(?:{})", rule.pattern)).map_err(|e| {
                LexError::InvalidPattern {
                    rule: rule.name.clone(),
                    pattern: rule.pattern.clone(),
                    message: e.to_string(),
                }
            })?;
            matchers.push(Matcher {
                name: rule.name.clone(),
                terminal: rule.terminal(),
                priority: rule.priority,
                regex,
            });
        }
        log::debug!("compiled tokenizer with {} rules", matchers.len());
        Ok(Tokenizer { matchers })
    }

    /// The longest non-empty match at the start of `rest`. Equal lengths go
    /// to the lower priority, then to the earlier rule.
    fn longest_match(&self, rest: &str) -> Option<(usize, &Matcher)> {
        let mut best: Option<(usize, &Matcher)> = None;
        for matcher in &self.matchers {
            let len = match matcher.regex.find(rest) {
                Some(m) if m.end() > 0 => m.end(),
                _ => continue,
            };
            let better = match best {
                None => true,
                Some((best_len, current)) => {
                    len > best_len || (len == best_len && matcher.priority < current.priority)
                }
            };
            if better {
                best = Some((len, matcher));
            }
        }
        best
    }

    /// Lazily tokenize `input`, stopping after the first lexical error.
    pub fn scan<'t, 'a>(&'t self, input: &'a str) -> Scanner<'t, 'a> {
        Scanner {
            tokenizer: self,
            position: Position::new(input),
            recover: false,
            done: false,
        }
    }

    /// Like `scan`, but an unmatched character is reported and skipped.
    pub fn scan_recovering<'t, 'a>(&'t self, input: &'a str) -> Scanner<'t, 'a> {
        Scanner {
            recover: true,
            ..self.scan(input)
        }
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        for lexeme in self.scan(input) {
            if let Lexeme::Token(token) = lexeme? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Every token that could be read, plus the errors that were skipped.
    pub fn tokenize_lossy(&self, input: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        for lexeme in self.scan_recovering(input) {
            match lexeme {
                Ok(Lexeme::Token(token)) => tokens.push(token),
                Ok(Lexeme::End(_)) => (),
                Err(e) => errors.push(e),
            }
        }
        (tokens, errors)
    }
}

/// Iterator over the lexemes of one input. Fused: once it has produced
/// `End` or halted on an error it only yields `None`.
pub struct Scanner<'t, 'a> {
    tokenizer: &'t Tokenizer,
    position: Position<'a>,
    recover: bool,
    done: bool,
}

impl<'t, 'a> Iterator for Scanner<'t, 'a> {
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.position.at_end() {
                self.done = true;
                return Some(Ok(Lexeme::End(self.position.idx)));
            }
            let start = self.position.clone();
            match self.tokenizer.longest_match(self.position.rest()) {
                Some((len, matcher)) => {
                    self.position.advance(len);
                    let terminal = match &matcher.terminal {
                        Some(terminal) => terminal.clone(),
                        None => continue,
                    };
                    let span = Span::from_positions(&start, &self.position);
                    let token = Token {
                        kind: matcher.name.clone(),
                        terminal,
                        text: span.as_str(self.position.input).to_owned(),
                        span,
                    };
                    log::trace!("token {} `{}` at {}", token.kind, token.text, span);
                    return Some(Ok(Lexeme::Token(token)));
                }
                None => {
                    let character = self.position.bump()?;
                    if self.recover {
                        log::warn!("skipping {:?} at offset {}", character, start.idx);
                    } else {
                        self.done = true;
                    }
                    return Some(Err(LexError::NoMatch {
                        offset: start.idx,
                        character,
                    }));
                }
            }
        }
        None
    }
}

impl<'t, 'a> FusedIterator for Scanner<'t, 'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(spec: &str) -> Tokenizer {
        Tokenizer::new(&spec.parse::<LexSpec>().unwrap()).unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<(&str, &str)> {
        tokens.iter().map(|t| (t.kind.as_str(), t.text.as_str())).collect()
    }

    #[test]
    fn longest_match_wins() {
        let t = tokenizer("LT := \"<\"\nLE := \"<=\"\n%\" \"");
        let tokens = t.tokenize("< <=").unwrap();
        assert_eq!(vec![("LT", "<"), ("LE", "<=")], kinds(&tokens));
    }

    #[test]
    fn equal_length_prefers_earlier_rule() {
        let t = tokenizer("IF := \"if\"\nIDENT := \"[a-z]+\"\n%\" \"");
        let tokens = t.tokenize("if iff").unwrap();
        assert_eq!(vec![("IF", "if"), ("IDENT", "iff")], kinds(&tokens));

        let t = tokenizer("IDENT := \"[a-z]+\"\nIF := \"if\"");
        assert_eq!(vec![("IDENT", "if")], kinds(&t.tokenize("if").unwrap()));
    }

    #[test]
    fn rules_beat_separators_on_ties() {
        let t = tokenizer("%\"x\"\nX := \"x\"");
        assert_eq!(vec![("X", "x")], kinds(&t.tokenize("x").unwrap()));
    }

    #[test]
    fn terminal_rules_use_spelling() {
        let t = tokenizer("%\" \"\nTERMINAL := \"\\(\"\nNONTERMINAL := \"S\"\nEMPTY_SYMBOL := \"\\$\"");
        let tokens = t.tokenize("( (").unwrap();
        assert_eq!(2, tokens.len());
        assert_eq!("(", tokens[0].terminal);
        assert_eq!(Span { start: 2, end: 3 }, tokens[1].span);
        // Nonterminal and empty spellings never match input.
        assert_eq!(
            Err(LexError::NoMatch {
                offset: 0,
                character: 'S'
            }),
            t.tokenize("S")
        );
    }

    #[test]
    fn scanner_ends_once() {
        let t = tokenizer("A := \"a\"");
        let mut scanner = t.scan("aa");
        assert!(matches!(scanner.next(), Some(Ok(Lexeme::Token(_)))));
        assert!(matches!(scanner.next(), Some(Ok(Lexeme::Token(_)))));
        assert_eq!(Some(Ok(Lexeme::End(2))), scanner.next());
        assert_eq!(None, scanner.next());
        assert_eq!(None, scanner.next());
    }

    #[test]
    fn scanner_halts_on_error() {
        let t = tokenizer("A := \"a\"");
        let lexemes: Vec<_> = t.scan("a?a").collect();
        assert_eq!(2, lexemes.len());
        assert_eq!(
            Err(LexError::NoMatch {
                offset: 1,
                character: '?'
            }),
            lexemes[1]
        );
    }

    #[test]
    fn lossy_keeps_tokens_around_errors() {
        let t = tokenizer("A := \"a\"\n%\" \"");
        let (tokens, errors) = t.tokenize_lossy("a ?? a");
        assert_eq!(vec![("A", "a"), ("A", "a")], kinds(&tokens));
        assert_eq!(2, errors.len());
        assert_eq!(
            LexError::NoMatch {
                offset: 3,
                character: '?'
            },
            errors[1]
        );
    }

    #[test]
    fn zero_length_matches_are_ignored() {
        let t = tokenizer("A := \"a*\"\nB := \"b\"");
        assert_eq!(vec![("B", "b"), ("A", "aa")], kinds(&t.tokenize("baa").unwrap()));
    }

    #[test]
    fn invalid_pattern() {
        let spec: LexSpec = "GOOD := \"a\"\nBAD := \"(\"".parse().unwrap();
        match Tokenizer::new(&spec) {
            Err(LexError::InvalidPattern { rule, pattern, .. }) => {
                assert_eq!("BAD", rule);
                assert_eq!("(", pattern);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

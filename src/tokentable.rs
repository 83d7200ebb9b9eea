//! The token-table document: every lexical rule, plus every token read from
//! a sample input.
//!
//! Lexing keeps going past characters no rule matches, so a single typo
//! does not hide the rest of the table. Keys are indices because several
//! rules share the names `TERMINAL` and `IGNORE`.
use std::collections::BTreeMap;

use grammar::LexSpec;
use parsegen::{LexError, Tokenizer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenType {
    #[serde(rename = "type")]
    pub kind: String,
    pub pattern: String,
    pub priority: usize,
    pub ignore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// A character that was skipped because no rule matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub offset: usize,
    pub character: char,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenTable {
    pub tokentypes: BTreeMap<usize, TokenType>,
    pub tokens: BTreeMap<usize, TokenEntry>,
    pub skipped: Vec<Skipped>,
}

impl TokenTable {
    pub fn build(lexspec: &LexSpec, tokenizer: &Tokenizer, input: &str) -> Self {
        let tokentypes = lexspec
            .rules()
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let entry = TokenType {
                    kind: rule.name.clone(),
                    pattern: rule.pattern.clone(),
                    priority: rule.priority,
                    ignore: rule.ignore,
                };
                (i, entry)
            })
            .collect();

        let (tokens, errors) = tokenizer.tokenize_lossy(input);
        let tokens = tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| {
                let entry = TokenEntry {
                    kind: token.kind,
                    text: token.text,
                };
                (i, entry)
            })
            .collect();

        let skipped = errors
            .into_iter()
            .filter_map(|e| match e {
                LexError::NoMatch { offset, character } => Some(Skipped { offset, character }),
                LexError::InvalidPattern { .. } => None,
            })
            .collect::<Vec<_>>();
        if !skipped.is_empty() {
            log::warn!("token table skipped {} unmatched characters", skipped.len());
        }

        TokenTable {
            tokentypes,
            tokens,
            skipped,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tokentypes": &self.tokentypes,
            "tokens": &self.tokens,
            "skipped": &self.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEX: &str = r#"% " "
TERMINAL := "\("
TERMINAL := "\)"
NUM := "[0-9]+"
"#;

    fn table(input: &str) -> TokenTable {
        let lexspec: LexSpec = LEX.parse().unwrap();
        let tokenizer = Tokenizer::new(&lexspec).unwrap();
        TokenTable::build(&lexspec, &tokenizer, input)
    }

    #[test]
    fn token_types_by_index() {
        let t = table("");
        assert_eq!(4, t.tokentypes.len());
        assert_eq!(
            TokenType {
                kind: "IGNORE".to_owned(),
                pattern: " ".to_owned(),
                priority: 4,
                ignore: true,
            },
            t.tokentypes[&3]
        );
        assert_eq!("\\(", t.tokentypes[&0].pattern);
        assert!(t.tokens.is_empty());
    }

    #[test]
    fn skip_and_continue() {
        let t = table("(12 ? 3)");
        let tokens: Vec<(&str, &str)> = t
            .tokens
            .values()
            .map(|e| (e.kind.as_str(), e.text.as_str()))
            .collect();
        assert_eq!(
            vec![("TERMINAL", "("), ("NUM", "12"), ("NUM", "3"), ("TERMINAL", ")")],
            tokens
        );
        assert_eq!(
            vec![Skipped {
                offset: 4,
                character: '?',
            }],
            t.skipped
        );
    }

    #[test]
    fn json_shape() {
        let json = table("7").to_json();
        assert_eq!("NUM", json["tokens"]["0"]["type"]);
        assert_eq!("7", json["tokens"]["0"]["text"]);
        assert_eq!(false, json["tokentypes"]["2"]["ignore"]);
        assert_eq!(0, json["skipped"].as_array().unwrap().len());
    }
}

use crate::span::Span;

/// A token represents a span over some text that satisfies a lexical rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Name of the lexical rule that matched.
    pub kind: String,
    /// Grammar terminal this token stands for.
    pub terminal: String,
    pub text: String,
    pub span: Span,
}

/// One item of a token stream. A stream always finishes with `End`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Token(Token),
    End(usize),
}

impl Lexeme {
    pub fn offset(&self) -> usize {
        match self {
            Lexeme::Token(token) => token.span.start,
            Lexeme::End(offset) => *offset,
        }
    }

    /// How the lexeme reads in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Lexeme::Token(token) => format!("`{}`", token.text),
            Lexeme::End(_) => "end of input".to_owned(),
        }
    }
}

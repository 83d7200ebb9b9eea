use grammar::{Grammar, GrammarSpec, LexSpec, Options};

pub const PARENS_LEX: &str = r#"%" ", "\t", "\n"
TERMINAL := "\("
TERMINAL := "\)"
"#;

pub const PARENS: &str = "S -> TS | eps\nT -> (S)";

pub const EXPR_LEX: &str = r#"%" "
TERMINAL := "\+"
TERMINAL := "\*"
TERMINAL := "\("
TERMINAL := "\)"
TERMINAL := "id"
"#;

pub const EXPR: &str = "E -> TE_\nE_ -> +TE_ | $\nT -> FT_\nT_ -> *FT_ | $\nF -> (E) | id";

pub fn grammar(lex: &str, text: &str) -> Grammar {
    let lexspec: LexSpec = lex.parse().unwrap();
    let spec: GrammarSpec = text.parse().unwrap();
    spec.resolve(&lexspec, &Options::default()).unwrap()
}

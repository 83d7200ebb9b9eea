use grammar::{Grammar, GrammarSpec, LexSpec, Options};
use parsegen::{
    select, DeterminismError, ParseError, PredictionTable, PredictiveParser, Tokenizer, Validator,
};
use proptest::prelude::*;

const PARENS_LEX: &str = r#"% " ", "\t", "\n"
TERMINAL := "\("
TERMINAL := "\)"
"#;

const PARENS: &str = "S -> TS | eps\nT -> (S)";

const EXPR_LEX: &str = r#"%" "
TERMINAL := "\+"
TERMINAL := "\*"
TERMINAL := "\("
TERMINAL := "\)"
TERMINAL := "id"
"#;

const EXPR: &str = "E -> TE_\nE_ -> +TE_ | $\nT -> FT_\nT_ -> *FT_ | $\nF -> (E) | id";

struct Compiled {
    grammar: Grammar,
    table: PredictionTable,
    tokenizer: Tokenizer,
}

fn compile(lex: &str, text: &str) -> Result<Compiled, DeterminismError> {
    let lexspec: LexSpec = lex.parse().unwrap();
    let spec: GrammarSpec = text.parse().unwrap();
    let grammar = spec.resolve(&lexspec, &Options::default()).unwrap();
    let (_, table) = select(parsegen::Strategy::Ll1, &grammar)?;
    let tokenizer = Tokenizer::new(&lexspec).unwrap();
    Ok(Compiled {
        grammar,
        table,
        tokenizer,
    })
}

impl Compiled {
    fn parser(&self) -> PredictiveParser<'_> {
        PredictiveParser::new(&self.grammar, &self.table, &self.tokenizer)
    }

    fn validator(&self) -> Validator<'_> {
        Validator::new(&self.grammar, &self.table, &self.tokenizer)
    }
}

#[test]
fn parens_accept_and_reject() {
    let parens = compile(PARENS_LEX, PARENS).unwrap();
    assert_eq!("S", parens.parser().parse("(())").unwrap().name);
    assert!(parens.validator().validate("(())").accepted);

    match parens.parser().parse("(()") {
        Err(ParseError::Syntax { offset, found, .. }) => {
            assert_eq!(3, offset);
            assert_eq!("end of input", found);
        }
        other => panic!("unexpected {:?}", other),
    }
    match parens.parser().parse(")(") {
        Err(ParseError::Syntax { offset, .. }) => assert_eq!(0, offset),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn left_recursion_is_rejected() {
    let lex = "%\" \"\nTERMINAL := \"\\+\"\nTERMINAL := \"id\"";
    let err = compile(lex, "E -> E+T | T\nT -> id").err().unwrap();
    assert_eq!(1, err.conflicts.len());
    assert!(err.to_string().contains("no deterministic strategy found"));
}

#[test]
fn disjoint_first_sets_are_conflict_free() {
    let lex = r#"%" "
TERMINAL := "a"
TERMINAL := "b"
TERMINAL := "c"
TERMINAL := "d"
"#;
    let grammars = [
        "S -> a S | b",
        "S -> A B\nA -> a | eps\nB -> b | c",
        "S -> a S b | eps",
        "S -> A d\nA -> a A | B\nB -> b | c | eps",
    ];
    for text in grammars {
        let compiled = compile(lex, text);
        assert!(compiled.is_ok(), "grammar: {}", text);
    }
    // FIRST/FOLLOW overlap on a nullable alternative.
    assert!(compile(lex, "S -> A a\nA -> a | eps").is_err());
}

fn parens_input() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof!["\\(", "\\)", " ", "x"], 0..16).prop_map(|v| v.concat())
}

fn expr_input() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof!["id", "\\+", "\\*", "\\(", "\\)", " "], 0..16)
        .prop_map(|v| v.join(""))
}

proptest! {
    #[test]
    fn parser_and_validator_agree_on_parens(input in parens_input()) {
        let parens = compile(PARENS_LEX, PARENS).unwrap();
        let parsed = parens.parser().parse(&input);
        let validation = parens.validator().validate(&input);
        prop_assert_eq!(parsed.is_ok(), validation.accepted);
        prop_assert_eq!(parsed.as_ref().err(), validation.error.as_ref());
        if let Ok(tree) = parsed {
            prop_assert_eq!("S", tree.name.as_str());
        }
    }

    #[test]
    fn parser_and_validator_agree_on_expressions(input in expr_input()) {
        let expr = compile(EXPR_LEX, EXPR).unwrap();
        let parsed = expr.parser().parse(&input);
        let validation = expr.validator().validate(&input);
        prop_assert_eq!(parsed.is_ok(), validation.accepted);
        if let Ok(tree) = parsed {
            prop_assert_eq!("E", tree.name.as_str());
        }
    }
}

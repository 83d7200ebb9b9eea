use emitted::{expr, parens};
use grammar::{parse_grammar, Grammar, LexSpec, Options};
use parsegen::{select, ParseError, ParseNode, PredictionTable, PredictiveParser, Strategy, Tokenizer};

const PARENS_LEX: &str = include_str!("../grammars/parens.lex");
const PARENS: &str = include_str!("../grammars/parens.ll");
const EXPR_LEX: &str = include_str!("../grammars/expr.lex");
const EXPR: &str = include_str!("../grammars/expr.ll");

/// The in-process parser for the same pair of specs.
struct Runtime {
    grammar: Grammar,
    table: PredictionTable,
    tokenizer: Tokenizer,
}

impl Runtime {
    fn new(lex: &str, text: &str) -> Self {
        let lexspec = LexSpec::parse(lex).unwrap();
        let grammar = parse_grammar(text)
            .unwrap()
            .resolve(&lexspec, &Options::default())
            .unwrap();
        let (_, table) = select(Strategy::Ll1, &grammar).unwrap();
        let tokenizer = Tokenizer::new(&lexspec).unwrap();
        Runtime {
            grammar,
            table,
            tokenizer,
        }
    }

    fn parse(&self, input: &str) -> Result<ParseNode, ParseError> {
        PredictiveParser::new(&self.grammar, &self.table, &self.tokenizer).parse(input)
    }
}

fn render(name: &str, children: Vec<String>) -> String {
    if children.is_empty() {
        name.to_owned()
    } else {
        format!("{}[{}]", name, children.join(" "))
    }
}

fn runtime_shape(node: &ParseNode) -> String {
    render(&node.name, node.children.iter().map(runtime_shape).collect())
}

fn parens_shape(node: &parens::Node) -> String {
    render(&node.name, node.children.iter().map(parens_shape).collect())
}

fn expr_shape(node: &expr::Node) -> String {
    render(&node.name, node.children.iter().map(expr_shape).collect())
}

struct TestCase {
    input: &'static str,
    /// Offset of the rejection, `None` when the input is accepted.
    offset: Option<usize>,
}

/// Run both parsers and check they agree on the verdict, the diagnostic
/// and the tree.
fn compare<N, E>(
    runtime: &Runtime,
    emitted: impl Fn(&str) -> Result<N, E>,
    shape: impl Fn(&N) -> String,
    offset: impl Fn(&E) -> Option<usize>,
    cases: Vec<TestCase>,
) where
    E: std::fmt::Display,
{
    for case in cases {
        match (runtime.parse(case.input), emitted(case.input)) {
            (Ok(tree), Ok(node)) => {
                assert_eq!(None, case.offset, "input {:?} was accepted", case.input);
                assert_eq!(runtime_shape(&tree), shape(&node), "input {:?}", case.input);
            }
            (Err(expected), Err(actual)) => {
                assert_eq!(case.offset, Some(expected.offset()), "input {:?}", case.input);
                assert_eq!(case.offset, offset(&actual), "input {:?}", case.input);
                assert_eq!(expected.to_string(), actual.to_string(), "input {:?}", case.input);
            }
            (expected, actual) => panic!(
                "verdicts differ on {:?}: runtime {:?}, emitted {:?}",
                case.input,
                expected.map(|_| ()),
                actual.map(|_| ()).map_err(|e| e.to_string())
            ),
        }
    }
}

#[test]
fn parens_agree_with_runtime() {
    let runtime = Runtime::new(PARENS_LEX, PARENS);
    let parser = parens::Parens::new().unwrap();

    let test_cases = vec![
        TestCase {
            input: "(())",
            offset: None,
        },
        TestCase {
            input: "()()",
            offset: None,
        },
        TestCase {
            input: " ( ( )\n) ",
            offset: None,
        },
        TestCase {
            input: "",
            offset: None,
        },
        TestCase {
            input: "(()",
            offset: Some(3),
        },
        TestCase {
            input: ")(",
            offset: Some(0),
        },
        TestCase {
            input: "(x",
            offset: Some(1),
        },
    ];

    compare(
        &runtime,
        |input| parser.parse(input),
        parens_shape,
        |e| match e {
            parens::Error::Syntax { offset, .. } | parens::Error::NoMatch { offset, .. } => {
                Some(*offset)
            }
            parens::Error::Pattern(_) => None,
        },
        test_cases,
    );
}

#[test]
fn expressions_agree_with_runtime() {
    let runtime = Runtime::new(EXPR_LEX, EXPR);
    let parser = expr::Expr::new().unwrap();

    let test_cases = vec![
        TestCase {
            input: "id + id * id",
            offset: None,
        },
        TestCase {
            input: "(id + id) * id",
            offset: None,
        },
        TestCase {
            input: "id +",
            offset: Some(4),
        },
        TestCase {
            input: "* id",
            offset: Some(0),
        },
        TestCase {
            input: "id id",
            offset: Some(3),
        },
        TestCase {
            input: "(id",
            offset: Some(3),
        },
    ];

    compare(
        &runtime,
        |input| parser.parse(input),
        expr_shape,
        |e| match e {
            expr::Error::Syntax { offset, .. } | expr::Error::NoMatch { offset, .. } => {
                Some(*offset)
            }
            expr::Error::Pattern(_) => None,
        },
        test_cases,
    );
}

#[test]
fn emitted_tables_match_the_grammar() {
    assert_eq!(&["(", ")"], parens::TERMINALS);
    assert_eq!(&["S", "T"], parens::NONTERMINALS);
    assert_eq!(Some(2), parens::predict(1, Some(0)));
    assert_eq!(Some(1), parens::predict(0, None));
    assert_eq!(None, parens::predict(1, Some(1)));

    assert_eq!(&["E", "E_", "T", "T_", "F"], expr::NONTERMINALS);
    assert_eq!(Some(7), expr::predict(4, Some(4)));
    assert_eq!(Some(5), expr::predict(3, Some(3)));
}

#[test]
fn emitted_tokens_carry_offsets() {
    let parser = expr::Expr::new().unwrap();
    let tokens = parser.tokenize("id+ (id)").unwrap();
    let offsets: Vec<(usize, usize)> = tokens.iter().map(|t| (t.terminal, t.offset)).collect();
    assert_eq!(vec![(4, 0), (0, 2), (2, 4), (4, 5), (3, 7)], offsets);
}

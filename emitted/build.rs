use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use grammar::{parse_grammar, LexSpec, Options};
use parsegen::{select, Strategy};

/// File stem under `grammars/` and the name of the emitted parser.
const PARSERS: &[(&str, &str)] = &[("parens", "Parens"), ("expr", "Expr")];

fn main() -> Result<(), Box<dyn Error>> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    for (stem, parser) in PARSERS {
        let lex_path = format!("grammars/{}.lex", stem);
        let grammar_path = format!("grammars/{}.ll", stem);
        println!("cargo:rerun-if-changed={}", lex_path);
        println!("cargo:rerun-if-changed={}", grammar_path);

        let lexspec = LexSpec::parse(&fs::read_to_string(&lex_path)?)?;
        let spec = parse_grammar(&fs::read_to_string(&grammar_path)?)?;
        let grammar = spec.resolve(&lexspec, &Options::default())?;
        let (_, table) = select(Strategy::Ll1, &grammar)?;
        let source = codegen::emit_to_string(&grammar, &lexspec, &table, parser, "")?;
        fs::write(Path::new(&outdir).join(format!("{}.rs", stem)), source)?;
    }

    Ok(())
}

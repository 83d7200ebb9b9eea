use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use llgen::{compile, lint, run, Request, Settings};
use parsegen::Strategy;

#[derive(Parser, Debug)]
#[command(name = "llgen")]
#[command(about = "LL(1) parser generator", long_about = None)]
struct Args {
    /// Settings file (defaults to ./llgen.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Specs {
    /// Lexer spec
    #[arg(value_name = "LEXER")]
    lexer: PathBuf,
    /// Grammar spec
    #[arg(value_name = "GRAMMAR")]
    grammar: PathBuf,
    /// Parsing strategy, `ll1` or `auto`
    #[arg(short, long)]
    strategy: Option<Strategy>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Emit a standalone parser module
    Generate {
        #[command(flatten)]
        specs: Specs,
        /// Name of the generated parser struct
        #[arg(short, long)]
        parser_name: Option<String>,
        /// Module path to wrap the parser in, e.g. `calc::parser`
        #[arg(short, long)]
        module: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Run a sample input and print the results as JSON
    Run {
        #[command(flatten)]
        specs: Specs,
        /// File holding the sample input
        #[arg(short, long, value_name = "FILE", conflicts_with = "text")]
        input: Option<PathBuf>,
        /// Sample input given inline
        #[arg(short, long)]
        text: Option<String>,
        /// Include the parse tree
        #[arg(long)]
        tree: bool,
        /// Include the token table
        #[arg(long)]
        tokens: bool,
        /// Include the validation trace
        #[arg(long)]
        validate: bool,
    },

    /// Print the prediction table
    Table {
        #[command(flatten)]
        specs: Specs,
        /// Print the FIRST and FOLLOW sets before the table
        #[arg(long)]
        sets: bool,
    },

    /// Report every problem in a pair of specs
    Lint {
        /// Lexer spec
        #[arg(value_name = "LEXER")]
        lexer: PathBuf,
        /// Grammar spec
        #[arg(value_name = "GRAMMAR")]
        grammar: PathBuf,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::discover(Path::new("."))?,
    };

    match args.command {
        Command::Generate {
            specs,
            parser_name,
            module,
            output,
        } => {
            let strategy = specs.strategy.unwrap_or(settings.strategy);
            let compiled = compile(
                read(&specs.lexer)?,
                read(&specs.grammar)?,
                strategy,
                settings.options(),
            )
            .await?;
            let parser_name = parser_name.unwrap_or_else(|| settings.parser_name.clone());
            let module = module.unwrap_or_else(|| settings.module_name.clone());

            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            for fragment in compiled.emit(&parser_name, &module)? {
                out.write_all(fragment.as_bytes())?;
            }
            out.flush()?;
        }
        Command::Run {
            specs,
            input,
            text,
            tree,
            tokens,
            validate,
        } => {
            let sample_input = match (input, text) {
                (Some(path), _) => Some(read(&path)?),
                (None, text) => text,
            };
            let request = Request {
                lexer_text: read(&specs.lexer)?,
                grammar_text: read(&specs.grammar)?,
                strategy: specs.strategy,
                want_parse_tree: tree,
                want_token_table: tokens,
                want_validation: validate,
                sample_input,
                ..Request::default()
            };
            let response = run(request, &settings).await;
            println!("{}", serde_json::to_string_pretty(&response.to_json())?);
        }
        Command::Table { specs, sets } => {
            let strategy = specs.strategy.unwrap_or(settings.strategy);
            let compiled = compile(
                read(&specs.lexer)?,
                read(&specs.grammar)?,
                strategy,
                settings.options(),
            )
            .await?;
            if sets {
                println!("{}", compiled.analysis.display(&compiled.grammar));
            }
            print!("{}", compiled.table.display(&compiled.grammar));
        }
        Command::Lint { lexer, grammar } => {
            let errors = lint(&read(&lexer)?, &read(&grammar)?, &settings.options());
            for e in &errors {
                eprintln!("{}: {}", e.kind(), e);
            }
            if !errors.is_empty() {
                bail!("{} problems found", errors.len());
            }
            println!("no problems found");
        }
    }
    Ok(())
}

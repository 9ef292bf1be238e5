//! rexp command line: run a file, an inline expression, or a REPL

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rexp::{parse_program, EvalConfig, LispEvaluator, Session, Value};

#[derive(Parser)]
#[command(name = "rexp")]
#[command(version, about = "Evaluator for a small Lisp with value-captured closures")]
struct Args {
    /// Program file to run
    file: Option<PathBuf>,

    /// Evaluate an expression given on the command line
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// Print results as a JSON array instead of one per line
    #[arg(long)]
    json: bool,

    /// Print the parsed program as JSON and exit
    #[arg(long)]
    dump_ast: bool,

    /// Maximum evaluation depth
    #[arg(long, default_value_t = EvalConfig::default().max_depth)]
    max_depth: usize,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        tracing::error!("{:#}", err);
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = EvalConfig {
        max_depth: args.max_depth,
    };
    let mut session = Session::with_evaluator(LispEvaluator::with_config(config));

    let source = match (&args.file, &args.eval) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, Some(expr)) => expr.clone(),
        (None, None) => return repl(&mut session),
    };

    if args.dump_ast {
        let program = parse_program(&source)?;
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    if args.json {
        let program = parse_program(&source)?;
        let values = session.eval_forms(&program.forms)?;
        let results: Vec<_> = values
            .iter()
            .filter(|value| !matches!(value, Value::Void))
            .map(Value::to_json)
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    session.run_source(&source)?;
    Ok(())
}

/// Reads forms from stdin until parentheses balance, then evaluates them
fn repl(session: &mut Session) -> Result<()> {
    println!("rexp {} - :env lists bindings, :quit exits", rexp::VERSION);
    let mut buffer = String::new();

    loop {
        print!("{}", if buffer.is_empty() { "> " } else { "... " });
        io::stdout().flush()?;

        let Some(line) = session.read_line()? else {
            println!();
            return Ok(());
        };

        if buffer.is_empty() {
            match line.trim() {
                "" => continue,
                ":quit" | ":q" => return Ok(()),
                ":env" => {
                    println!("{}", session.env().names().join(" "));
                    continue;
                }
                _ => {}
            }
        }

        buffer.push_str(&line);
        if paren_depth(&buffer) > 0 {
            continue;
        }

        let source = std::mem::take(&mut buffer);
        if let Err(err) = session.run_source(&source) {
            tracing::debug!(error = ?err, "repl input failed");
            eprintln!("error: {}", err);
        }
    }
}

/// Open minus close delimiters outside strings and comments
fn paren_depth(source: &str) -> i64 {
    let mut depth = 0;
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '#' if chars.peek() == Some(&'|') => {
                chars.next();
                // non-nesting, like the scanner; unterminated runs to the end
                while let Some(c) = chars.next() {
                    if c == '|' && chars.peek() == Some(&'#') {
                        chars.next();
                        break;
                    }
                }
            }
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ => {}
        }
    }

    // an unterminated string keeps the form open
    if in_string {
        depth.max(1)
    } else {
        depth
    }
}

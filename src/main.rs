use std::{
    fs,
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process,
};

use clap::Parser;
use slowpp::{config::parse_flag_value, interpreter::evaluator::core::Io, run_source_with};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// slowpp runs programs written in slow++, a small line-oriented scripting
/// language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The program to run.
    #[arg(default_value = "code.slow++")]
    script: PathBuf,

    /// Runs the given source instead of reading a file.
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Overrides a flag, or a family when the name starts with `!`. May be
    /// repeated.
    #[arg(long = "flag", value_name = "NAME=BOOL", value_parser = parse_override)]
    flags: Vec<(String, bool)>,

    /// Leaves the terminal as it is instead of clearing it before the run.
    #[arg(long)]
    no_clear: bool,
}

/// Parses a `NAME=BOOL` flag override.
fn parse_override(text: &str) -> Result<(String, bool), String> {
    let (name, value) = text.split_once('=')
                            .ok_or_else(|| format!("expected NAME=BOOL, found '{text}'"))?;
    let value = parse_flag_value(value).ok_or_else(|| format!("'{value}' is not True or False"))?;
    Ok((name.trim().to_string(), value))
}

/// Installs the stderr log subscriber when `RUST_LOG` is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr))
                                      .with(EnvFilter::from_default_env())
                                      .init();
    }
}

fn main() {
    let args = Args::parse();
    init_tracing();

    let source = match args.eval {
        Some(source) => source,
        None => fs::read_to_string(&args.script).unwrap_or_else(|_| {
                    eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                              args.script.display());
                    process::exit(1);
                }),
    };

    let mut stdout = io::stdout();
    if !args.no_clear && stdout.is_terminal() {
        // Errors here only mean the terminal stays uncleared.
        let _ = write!(stdout, "\x1bc").and_then(|()| stdout.flush());
    }

    let result = run_source_with(&source, &args.flags, Io::stdio(), &mut io::stderr());

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

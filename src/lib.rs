//! # slowpp
//!
//! slowpp is an interpreter for slow++, a small line-oriented scripting
//! language with C-like operators, functions, conditionals, loops, lists and
//! dicts. Programs are assembled into logical lines, function definitions are
//! hoisted, and each line's tokens are rewritten in place until they reduce to
//! a value.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::io::{self, Write};

use tracing::{error, warn};

use crate::{
    config::Config,
    error::{RuntimeError, ScriptError},
    interpreter::{
        evaluator::core::{Context, Io},
        program::Program,
        source::{break_lines, SourceLine},
    },
};

/// Interpreter flags and the `#flag` header.
///
/// This module declares every flag the interpreter knows, the families that
/// group them, and the parsing of the header lines that set them before a
/// program runs.
pub mod config;
/// Provides unified error types for loading and running programs.
///
/// This module defines all errors that can be raised while assembling lines,
/// tokenizing, hoisting functions or evaluating code. Every error carries the
/// line it occurred on.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (syntax and runtime).
/// - Attaches line numbers and detailed messages for context.
/// - Pairs a fatal error with the offending source text for reporting.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together line assembly, lexing, hoisting, evaluation and
/// value representations to provide a complete runtime for slow++ programs.
///
/// # Responsibilities
/// - Coordinates all core components: source, lexer, program and evaluator.
/// - Provides the building blocks used by the entry points below.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and index arithmetic.
///
/// # Responsibilities
/// - Safely convert between `i64`, `usize`, and `f64` without silent data
///   loss.
/// - Resolve negative and out of range indices.
pub mod util;

/// Runs a program using standard input and output.
///
/// Diagnostics selected by the debugging flags are written to standard error.
///
/// # Errors
/// Returns the first error raised while loading or running the program,
/// together with the text of the line it occurred on.
///
/// # Examples
/// ```
/// use slowpp::run_source;
///
/// // A program that only assigns prints nothing and succeeds.
/// assert!(run_source("x = 2 + 2").is_ok());
///
/// // Using a variable that was never assigned is an error.
/// let err = run_source("y = x + 1").unwrap_err();
/// assert_eq!(err.line(), 1);
/// ```
pub fn run_source(source: &str) -> Result<(), ScriptError> {
    run_source_with(source, &[], Io::stdio(), &mut io::stderr())
}

/// Runs a program with explicit flag overrides and streams.
///
/// The flag header at the top of the program is applied first, then
/// `overrides` in order; an override may name a family with a leading `!`.
/// Unknown override names are skipped with a warning. After the run,
/// successful or not, the diagnostics selected by the debugging flags are
/// written to `diagnostics`.
///
/// # Parameters
/// - `source`: The program text.
/// - `overrides`: Flag or family names and the value to give them.
/// - `io`: The streams `print` and `input` use.
/// - `diagnostics`: Destination of the diagnostics dump.
///
/// # Errors
/// Returns the first error raised while loading or running the program.
///
/// # Examples
/// ```
/// use std::io;
///
/// use slowpp::{interpreter::evaluator::core::Io, run_source_with};
///
/// let mut dump = Vec::new();
/// let overrides = [("showvars".to_string(), true)];
/// run_source_with("x = 3", &overrides, Io::new(io::sink(), io::empty()), &mut dump).unwrap();
///
/// assert_eq!(String::from_utf8(dump).unwrap(),
///            "{'False': False, 'None': None, 'True': True, 'x': 3}\n");
/// ```
pub fn run_source_with(source: &str,
                       overrides: &[(String, bool)],
                       io: Io,
                       diagnostics: &mut dyn Write)
                       -> Result<(), ScriptError> {
    let lines = break_lines(source);
    let with_text = |error: RuntimeError| {
        let text = source_text(&lines, error.line());
        ScriptError { error, text }
    };

    let mut config = Config::default();
    let header_len = config.apply_header(&lines).map_err(with_text)?;
    for (name, value) in overrides {
        if !config.apply(name, *value) {
            warn!(flag = %name, "unknown flag override ignored");
        }
    }

    let program = Program::build(lines.clone(), header_len).map_err(with_text)?;
    let mut context = Context::new(program, config, io);
    let result = context.run();

    if let Err(e) = &result {
        error!(line = e.line(), "run aborted: {e}");
    }

    let flushed = context.io.output.flush();
    if let Err(e) = context.dump(diagnostics) {
        warn!("failed to write diagnostics: {e}");
    }

    result.and_then(|()| {
              flushed.map_err(|e| RuntimeError::Io { details: e.to_string(),
                                                     line:    context.program.number(context.cursor), })
          })
          .map_err(with_text)
}

/// Returns the text of the logical line starting on physical line `number`.
fn source_text(lines: &[SourceLine], number: usize) -> Option<String> {
    lines.iter().find(|l| l.number == number).map(|l| l.text.clone())
}

//! Code to configure and run the interpreter on an input source code file.

use std::fs;
use std::io::Write;

use clap::{Parser, ValueEnum};

use crate::box_tree_impl::box_tree_execution::{eval_step, normalize};
use crate::box_tree_impl::box_tree_recursive_descent_parsing::{self, ParseError};

/// How much evaluation to do on each parsed expression.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Only print the parsed expressions.
    None,
    /// Run a single reduction pass.
    SingleStep,
    /// Repeat reduction passes until the expression stops changing.
    Normalize,
}

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The input filepath to run on. Holds one expression per line.
    pub src_filepath: String,

    /// How much evaluation to do on each expression.
    #[arg(short, long, value_enum, default_value_t = EvalMode::SingleStep)]
    pub eval_mode: EvalMode,

    /// Upper bound on reduction passes when normalizing.
    #[arg(short, long, default_value_t = 10_000)]
    pub max_steps: usize,

    /// Log each parsed expression and reduction pass to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Errors that may be thrown when running the interpreter.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("Input file error: {0}")]
    InputFileError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    BoxTreeParseError(#[from] box_tree_recursive_descent_parsing::ParseError),
}

/// Parses every expression in `program_string` and writes each one, along
/// with its evaluation under `eval_mode`, to `out` as soon as it is ready.
/// Stops at the first parse error.
pub fn run_program(
    program_string: &str,
    eval_mode: EvalMode,
    max_steps: usize,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let mut parser = box_tree_recursive_descent_parsing::Parser::new(program_string)?;

    loop {
        let expr_node = match parser.parse() {
            Ok(expr_node) => expr_node,
            Err(ParseError::EndOfInput) => return Ok(()),
            Err(parse_error) => return Err(parse_error.into()),
        };

        writeln!(out, "Expression: {}", expr_node)?;

        match eval_mode {
            EvalMode::None => {}

            EvalMode::SingleStep => {
                writeln!(out, "Evaluated: {}", eval_step(&expr_node))?;
            }

            EvalMode::Normalize => {
                let outcome = normalize(&expr_node, max_steps);

                if outcome.converged {
                    writeln!(out, "Normalized: {}", outcome.expr)?;
                } else {
                    writeln!(out, "Normalized: {} (step limit reached)", outcome.expr)?;
                }
            }
        }
    }
}

/// Run the interpreter (i.e. the lexer, parser, and evaluation) given an
/// interpreter config.
pub fn run_interpreter(config: &InterpreterConfig, out: &mut impl Write) -> Result<(), RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(&config.src_filepath)?;

    return run_program(
        program_string.as_str(),
        config.eval_mode,
        config.max_steps,
        out,
    );
}

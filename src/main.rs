//! Run a given lambda calculus program and print each expression, along with
//! its evaluation, to standard output.
//!
//! Example usage:
//!
//!     cargo run -- --eval-mode normalize test_programs/church_numerals.lc

use std::io;
use std::process::ExitCode;

use clap::Parser;
use rust_lambda_uniq::end_to_end::{run_interpreter, InterpreterConfig};
use tracing::Level;

fn main() -> ExitCode {
    let interpreter_config = InterpreterConfig::parse();

    let max_level = if interpreter_config.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout().lock();

    match run_interpreter(&interpreter_config, &mut stdout) {
        Ok(()) => {
            return ExitCode::SUCCESS;
        }

        Err(run_error) => {
            eprintln!("{}", run_error);
            return ExitCode::FAILURE;
        }
    }
}

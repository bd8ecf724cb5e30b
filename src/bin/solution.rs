//! Standalone candidate executable for black-box grading
//!
//! Reads semicolon-delimited records from stdin until end-of-input, sorts
//! them, and writes one formatted line per record to stdout. A malformed
//! line is reported on stderr and exits non-zero.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use exercise_grader::solution::{from_line, order, to_line};

fn main() -> ExitCode {
    let stdin = io::stdin();
    let mut lego_sets = Vec::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("failed to read stdin: {e}");
                return ExitCode::FAILURE;
            }
        };
        if line.is_empty() {
            continue;
        }
        match from_line(&line) {
            Ok(set) => lego_sets.push(set),
            Err(e) => {
                eprintln!("{e:#}");
                return ExitCode::FAILURE;
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for set in order(lego_sets) {
        if writeln!(out, "{}", to_line(&set)).is_err() {
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

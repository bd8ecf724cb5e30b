//! Exercise grading harness CLI
//!
//! Resolves the exercise identifier (from a flag or the working
//! directory), fetches the remote test configuration, and grades the
//! candidate solution in unit or black-box mode. The first fault aborts
//! the run; its formatted report is printed and the process exits
//! non-zero.
//!
//! ## Usage
//!
//! ```bash
//! # In-process checks of the solution's type and functions
//! exercise-grader unit --exercise P108104
//!
//! # Black-box run of a candidate executable
//! exercise-grader run --exercise P108104 --command ./solution
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use exercise_grader::cli::{self, Args};
use exercise_grader::fixtures::{exercise_id_from_cwd, FixtureStore};
use exercise_grader::runner::{BlackBoxRunner, UnitTestRunner};
use exercise_grader::solution::LegoSolution;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .compact()
        .init();

    let store = FixtureStore::new()?;

    match args.command {
        cli::Command::Unit(unit_args) => {
            let exercise = resolve_exercise(unit_args.exercise)?;
            info!("unit testing exercise {exercise}");

            let registry = LegoSolution;
            UnitTestRunner::new(&store, &registry).run(&exercise).await?;

            info!("all unit checks passed for {exercise}");
        }
        cli::Command::Run(run_args) => {
            let exercise = resolve_exercise(run_args.exercise)?;
            let (program, rest) = run_args
                .command
                .split_first()
                .context("candidate command is empty")?;
            info!(
                "black-box testing exercise {exercise} with {:?}",
                run_args.command
            );

            BlackBoxRunner::new(&store, program, rest).run(&exercise).await?;

            info!("all black-box tests passed for {exercise}");
        }
    }

    Ok(())
}

fn resolve_exercise(flag: Option<String>) -> Result<String> {
    flag.or_else(exercise_id_from_cwd).context(
        "cannot derive an exercise identifier from the working directory; pass --exercise",
    )
}

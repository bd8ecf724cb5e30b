//! CLI argument parsing
//!
//! Defines the command-line interface using clap.

use clap::{Parser, Subcommand};

/// Exercise grading harness
#[derive(Parser, Debug)]
#[command(name = "exercise-grader")]
#[command(version = "0.1.0")]
#[command(about = "Grade a candidate solution against remote test fixtures")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run in-process unit checks of the solution's type and functions
    Unit(UnitArgs),

    /// Run the solution as a subprocess and compare its textual output
    Run(RunArgs),
}

/// Arguments for unit-mode grading
#[derive(Parser, Debug)]
pub struct UnitArgs {
    /// Exercise identifier (defaults to the working directory's parent name)
    #[arg(short, long)]
    pub exercise: Option<String>,
}

/// Arguments for black-box grading
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Exercise identifier (defaults to the working directory's parent name)
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// Candidate command to execute (program followed by its arguments)
    #[arg(short, long, num_args = 1.., default_value = "./solution")]
    pub command: Vec<String>,
}

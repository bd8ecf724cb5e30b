//! Exercise grading harness
//!
//! Fetches test fixtures from a remote content store and grades a
//! candidate solution in one of two modes:
//!
//! - **Unit mode**: reflective-style checks of the solution's declared
//!   record type and functions, run in-process under per-case timeouts.
//! - **Black-box mode**: the solution runs as an isolated subprocess fed
//!   textual stdin, with stdout compared line-by-line against the expected
//!   output and mismatches rendered as an aligned table.
//!
//! Grading is fail-fast: the first fault aborts the remaining test
//! identifiers, fully formatted for display.

pub mod cli;
pub mod compare;
pub mod error;
pub mod fixtures;
pub mod invoke;
pub mod report;
pub mod runner;
pub mod solution;

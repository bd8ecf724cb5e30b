//! Sample candidate solution
//!
//! The external collaborator the harness grades: a Lego-set record type
//! with parse/format/order functions, wired into a `SolutionRegistry` for
//! unit mode and into the `solution` binary for black-box mode. The
//! harness core never depends on anything in here.

mod lego;

pub use lego::{from_line, order, to_line, LegoSet, LegoSolution};

//! Timeout-bounded invocation of candidate code
//!
//! In-process callables run on a blocking task joined with a wall-clock
//! timeout; candidate subprocesses run with piped stdio and are killed
//! when the command-level limit elapses.

mod bounded;
mod process;

pub use bounded::{invoke_blocking, Callable, Outcome};
pub use process::{run_process, ProcessOutcome};

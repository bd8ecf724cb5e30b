//! Fault taxonomy for the grading harness
//!
//! Every failure path in a grading run maps to exactly one variant here.
//! Faults are fail-fast: the first one raised aborts the remaining test
//! identifiers. The `Display` of a variant carries the fully formatted
//! report, so callers only ever print the error.

use std::fmt;
use thiserror::Error;

/// Which kind of solution member was looked up and not found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Type,
    Function,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Type => write!(f, "type"),
            MemberKind::Function => write!(f, "function"),
        }
    }
}

/// Grading harness errors
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Transport failure, non-success status, or an unparseable fixture body.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A fixture or declared suite violates the expected shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// The candidate does not expose a declared type or function.
    #[error("solution does not expose {kind} <<{name}>>")]
    MissingMember { kind: MemberKind, name: String },

    /// A candidate call exceeded its wall-clock limit. Rendered in the
    /// same bordered block as every other unit-mode fault.
    #[error("{}", crate::report::wrap_fault(.function, &format!("function <<{}>> timed out after {} seconds", .function, .limit)))]
    Timeout { function: String, limit: f64 },

    /// The candidate raised while executing; the report is pre-formatted.
    #[error("{0}")]
    Fault(String),

    /// Expected and actual values or line sequences differ.
    #[error("{0}")]
    OutputMismatch(String),

    /// The candidate process exited with non-zero status or was killed.
    #[error("{0}")]
    Process(String),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

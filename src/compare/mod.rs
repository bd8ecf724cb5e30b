//! Structural comparison of expected and actual values
//!
//! Deep equality over JSON-like values. On inequality the raised fault
//! embeds both renderings, so the caller only adds context.

use serde_json::Value;

use crate::error::{HarnessError, Result};
use crate::report;

/// Assert deep equality, raising a rendered mismatch fault otherwise.
///
/// Object comparison is key-based and order-insensitive; field *order* is
/// checked separately by the schema pass, not here.
pub fn ensure_equal(expected: &Value, actual: &Value, when: &str) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(HarnessError::OutputMismatch(report::mismatch(
            when, expected, actual,
        )))
    }
}

/// Scalar convenience for counts and name lists.
pub fn ensure_equal_as<T: Into<Value>>(expected: T, actual: T, when: &str) -> Result<()> {
    ensure_equal(&expected.into(), &actual.into(), when)
}

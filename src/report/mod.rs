//! Shared failure-report formatting
//!
//! Both runners raise their faults through these helpers so diagnostics
//! look the same regardless of grading mode.

use serde_json::Value;

/// Bordered block naming the unit under test and embedding the fault.
pub fn wrap_fault(unit_name: &str, message: &str) -> String {
    format!(
        "\n\nSTART ============================== UNIT TESTING {unit_name} ==============================\n\
         \n\
         THE FOLLOWING EXCEPTION HAS BEEN THROWN:\n\
         \n\
         {message}\n\
         \n\
         END ================================ UNIT TESTING {unit_name} ==============================\n"
    )
}

/// WHEN/EXPECTED/ACTUAL block raised on every structural mismatch.
pub fn mismatch(when: &str, expected: &Value, actual: &Value) -> String {
    format!(
        "\n\nWHEN {when}\n\
         \n\
         EXPECTED:\n<<\n{}\n>>\n\
         \n\
         ACTUAL:\n<<\n{}\n>>\n",
        render_value(expected, 0),
        render_value(actual, 0),
    )
}

/// Human-oriented rendering of a fixture or candidate value.
///
/// Scalars render as their literal form, scalar sequences as one bracketed
/// line, sequences of composites as one numbered line per element, and
/// anything else falls back to compact JSON.
pub fn render_value(value: &Value, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match value {
        Value::String(s) => format!("{pad}{s}"),
        Value::Number(n) => format!("{pad}{n}"),
        Value::Bool(b) => format!("{pad}{b}"),
        Value::Null => format!("{pad}null"),
        Value::Array(items) => {
            if items.iter().all(is_scalar) {
                let rendered: Vec<String> = items.iter().map(|v| render_value(v, 0)).collect();
                format!("{pad}[{}]", rendered.join(", "))
            } else {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| format!("{pad}{i}. {v}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Value::Object(_) => format!("{pad}{value}"),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

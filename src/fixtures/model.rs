//! Fixture data model
//!
//! Typed forms of the three remote fixture kinds. Field order inside a
//! type schema is significant, so maps come from `serde_json` built with
//! `preserve_order`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{HarnessError, Result};

/// Ordered list of test identifiers plus the command-level timeout.
#[derive(Clone, Debug, Deserialize)]
pub struct TestConfiguration {
    pub tests: Vec<String>,
    #[serde(rename = "timeout-cmd", deserialize_with = "seconds")]
    pub timeout_cmd: f64,
}

/// One black-box test case: raw input text and the expected output text.
#[derive(Clone, Debug)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// One unit-test case: named arguments, expected result, per-case limit.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitCase {
    #[serde(rename = "in")]
    pub input: Map<String, Value>,
    #[serde(rename = "out")]
    pub output: Value,
    pub limit: f64,
}

/// Per-test-identifier unit suite: which types and functions to check,
/// their expected schemas, and the cases for each function.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitTestSuite {
    #[serde(rename = "type-order")]
    pub type_order: Vec<String>,
    pub types: Map<String, Value>,
    #[serde(rename = "function-order")]
    pub function_order: Vec<String>,
    pub functions: HashMap<String, Vec<UnitCase>>,
}

impl UnitTestSuite {
    /// The record type the argument builders construct instances of.
    pub fn primary_type(&self) -> Result<&str> {
        self.type_order
            .first()
            .map(String::as_str)
            .ok_or_else(|| HarnessError::Schema("suite declares an empty type-order".to_string()))
    }

    /// Expected schema of one declared type as ordered (field, type-name) pairs.
    pub fn type_schema(&self, name: &str) -> Result<Vec<(String, String)>> {
        let entry = self.types.get(name).ok_or_else(|| {
            HarnessError::Schema(format!("suite declares no schema for type <<{name}>>"))
        })?;
        let fields = entry.as_object().ok_or_else(|| {
            HarnessError::Schema(format!("schema of type <<{name}>> is not an object"))
        })?;

        let mut schema = Vec::with_capacity(fields.len());
        for (field, type_name) in fields {
            let type_name = type_name.as_str().ok_or_else(|| {
                HarnessError::Schema(format!(
                    "type of field <<{field}>> in <<{name}>> is not a string"
                ))
            })?;
            schema.push((field.clone(), type_name.to_string()));
        }
        Ok(schema)
    }

    /// Declared cases of one function, in fixture order.
    pub fn cases(&self, function: &str) -> Result<&[UnitCase]> {
        self.functions
            .get(function)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                HarnessError::Schema(format!(
                    "suite declares no cases for function <<{function}>>"
                ))
            })
    }
}

/// The wire format carries timeouts either as a number or as a string
/// such as `"2.0"`.
fn seconds<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

//! Lego-set exercise solution
//!
//! Records are semicolon-delimited on input (`number;name;theme;pieces`)
//! and space-delimited on output (`name number pieces theme`). Ordering is
//! by descending piece count, then theme, name, and number ascending.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;

use crate::runner::{FieldDescriptor, SolutionFunction, SolutionRegistry};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegoSet {
    pub number: i64,
    pub name: String,
    pub theme: String,
    pub pieces: i64,
}

/// Parse one delimited line into a record.
pub fn from_line(line: &str) -> anyhow::Result<LegoSet> {
    let line = line.trim_end_matches('\n');
    let tokens: Vec<&str> = line.split(';').collect();
    if tokens.len() != 4 {
        return Err(anyhow!(
            "expected 4 semicolon-delimited fields, got {} in line <<{line}>>",
            tokens.len()
        ));
    }

    Ok(LegoSet {
        number: tokens[0]
            .trim()
            .parse()
            .with_context(|| format!("invalid set number <<{}>>", tokens[0]))?,
        name: tokens[1].to_string(),
        theme: tokens[2].to_string(),
        pieces: tokens[3]
            .trim()
            .parse()
            .with_context(|| format!("invalid piece count <<{}>>", tokens[3]))?,
    })
}

/// Render one record as its canonical output line.
pub fn to_line(lego_set: &LegoSet) -> String {
    format!(
        "{} {} {} {}",
        lego_set.name, lego_set.number, lego_set.pieces, lego_set.theme
    )
}

/// Sort records by descending piece count, then theme, name, and number.
pub fn order(mut lego_sets: Vec<LegoSet>) -> Vec<LegoSet> {
    lego_sets.sort_by_key(|set| {
        (
            Reverse(set.pieces),
            set.theme.clone(),
            set.name.clone(),
            set.number,
        )
    });
    lego_sets
}

/// Registry wiring of the solution for unit-mode grading. Values cross the
/// boundary as owned JSON, so the harness never shares state with the
/// candidate code.
pub struct LegoSolution;

impl SolutionRegistry for LegoSolution {
    fn describe_type(&self, name: &str) -> Option<Vec<FieldDescriptor>> {
        (name == "LegoSet").then(|| {
            vec![
                FieldDescriptor::new("number", "int"),
                FieldDescriptor::new("name", "str"),
                FieldDescriptor::new("theme", "str"),
                FieldDescriptor::new("pieces", "int"),
            ]
        })
    }

    fn lookup_function(&self, name: &str) -> Option<SolutionFunction> {
        match name {
            "from_line" => Some(SolutionFunction::new(
                &["line"],
                Arc::new(|args| {
                    let line = args
                        .get("line")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| anyhow!("missing string argument <<line>>"))?;
                    Ok(serde_json::to_value(from_line(line)?)?)
                }),
            )),
            "to_line" => Some(SolutionFunction::new(
                &["lego_set"],
                Arc::new(|args| {
                    let set: LegoSet = serde_json::from_value(
                        args.get("lego_set")
                            .cloned()
                            .ok_or_else(|| anyhow!("missing argument <<lego_set>>"))?,
                    )?;
                    Ok(serde_json::Value::String(to_line(&set)))
                }),
            )),
            "order" => Some(SolutionFunction::new(
                &["lego_sets"],
                Arc::new(|args| {
                    let sets: Vec<LegoSet> = serde_json::from_value(
                        args.get("lego_sets")
                            .cloned()
                            .ok_or_else(|| anyhow!("missing argument <<lego_sets>>"))?,
                    )?;
                    Ok(serde_json::to_value(order(sets))?)
                }),
            )),
            _ => None,
        }
    }
}

//! Solution registry interface
//!
//! The harness never inspects the candidate at runtime; the candidate
//! satisfies this registry instead. `describe_type` yields ordered field
//! descriptors, `lookup_function` yields a callable handle or absence.

use std::collections::HashMap;

use crate::invoke::Callable;

/// One declared field of a solution record type, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A callable exposed by the candidate, with its declared parameter names.
#[derive(Clone)]
pub struct SolutionFunction {
    pub params: Vec<String>,
    pub call: Callable,
}

impl SolutionFunction {
    pub fn new(params: &[&str], call: Callable) -> Self {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            call,
        }
    }

    /// The parameter a single composite argument binds to.
    pub fn first_param(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }
}

/// What the candidate solution exposes for reflective-style checking.
pub trait SolutionRegistry {
    fn describe_type(&self, name: &str) -> Option<Vec<FieldDescriptor>>;
    fn lookup_function(&self, name: &str) -> Option<SolutionFunction>;
}

/// Calling convention of a declared function: how its arguments are built
/// from a case and what the expected result is constructed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionRole {
    /// Text line in, primary record out (canonical name `from_line`).
    Parse,
    /// Primary record in, text line out (canonical name `to_line`).
    Format,
    /// Record sequence in, sorted record sequence out (canonical name `order`).
    Order,
}

/// Name-to-role lookup supplied alongside the suite. New roles or aliases
/// extend the table without touching the runner.
#[derive(Clone, Debug)]
pub struct RoleTable {
    roles: HashMap<String, FunctionRole>,
}

impl RoleTable {
    /// The canonical exercise vocabulary.
    pub fn standard() -> Self {
        let mut roles = HashMap::new();
        roles.insert("from_line".to_string(), FunctionRole::Parse);
        roles.insert("to_line".to_string(), FunctionRole::Format);
        roles.insert("order".to_string(), FunctionRole::Order);
        Self { roles }
    }

    pub fn with_role(mut self, name: impl Into<String>, role: FunctionRole) -> Self {
        self.roles.insert(name.into(), role);
        self
    }

    pub fn role_of(&self, name: &str) -> Option<FunctionRole> {
        self.roles.get(name).copied()
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::standard()
    }
}

//! Grading runners
//!
//! The unit runner drives in-process checks against a solution registry;
//! the black-box runner drives subprocess I/O checks. Both are fail-fast
//! across test identifiers.

mod blackbox;
mod registry;
mod unit;

pub use blackbox::BlackBoxRunner;
pub use registry::{FieldDescriptor, FunctionRole, RoleTable, SolutionFunction, SolutionRegistry};
pub use unit::UnitTestRunner;

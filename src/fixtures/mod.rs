//! Remote fixture retrieval
//!
//! Fetches test configurations, black-box test cases, and unit-test suites
//! from the exercise content store, and parses them into typed fixtures.

mod model;
mod store;

pub use model::{TestCase, TestConfiguration, UnitCase, UnitTestSuite};
pub use store::{exercise_id_from_cwd, FixtureStore, MASTER_URL};

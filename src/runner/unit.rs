//! Unit-mode grading
//!
//! Per test identifier: fetch the suite, check declared types, then check
//! declared functions case by case, failing on the first mismatch. The
//! suite's type-order and function-order drive iteration and are fully
//! consumed before success is declared.

use serde_json::{Map, Value};
use tracing::info;

use crate::compare;
use crate::error::{HarnessError, MemberKind, Result};
use crate::fixtures::{FixtureStore, UnitCase, UnitTestSuite};
use crate::invoke;
use crate::report;
use crate::runner::{FunctionRole, RoleTable, SolutionFunction, SolutionRegistry};

/// Drives reflective-style checks of a solution registry.
pub struct UnitTestRunner<'a, R: SolutionRegistry> {
    store: &'a FixtureStore,
    registry: &'a R,
    roles: RoleTable,
}

impl<'a, R: SolutionRegistry> UnitTestRunner<'a, R> {
    pub fn new(store: &'a FixtureStore, registry: &'a R) -> Self {
        Self {
            store,
            registry,
            roles: RoleTable::standard(),
        }
    }

    /// Replace the name-to-role table (aliases, additional vocabularies).
    pub fn with_roles(mut self, roles: RoleTable) -> Self {
        self.roles = roles;
        self
    }

    /// Grade one exercise: every test identifier in configuration order,
    /// aborting on the first fault.
    pub async fn run(&self, exercise_id: &str) -> Result<()> {
        let conf = self.store.fetch_configuration(exercise_id).await?;

        for test_id in &conf.tests {
            info!("unit testing {test_id}");
            let suite = self.store.fetch_unit_suite(exercise_id, test_id).await?;
            self.check_suite(&suite).await?;
        }

        Ok(())
    }

    /// Check one fetched suite against the registry.
    pub async fn check_suite(&self, suite: &UnitTestSuite) -> Result<()> {
        self.check_types(suite)?;
        self.check_functions(suite).await
    }

    fn check_types(&self, suite: &UnitTestSuite) -> Result<()> {
        for type_name in &suite.type_order {
            self.check_type(suite, type_name).map_err(|e| match e {
                HarnessError::MissingMember { .. } => e,
                other => HarnessError::Schema(report::wrap_fault(type_name, &other.to_string())),
            })?;
        }
        Ok(())
    }

    fn check_type(&self, suite: &UnitTestSuite, type_name: &str) -> Result<()> {
        let expected = suite.type_schema(type_name)?;
        let actual =
            self.registry
                .describe_type(type_name)
                .ok_or_else(|| HarnessError::MissingMember {
                    kind: MemberKind::Type,
                    name: type_name.to_string(),
                })?;

        compare::ensure_equal_as(
            expected.len() as u64,
            actual.len() as u64,
            "checking number of fields",
        )?;

        let expected_names: Vec<Value> = expected.iter().map(|(n, _)| n.clone().into()).collect();
        let actual_names: Vec<Value> = actual.iter().map(|f| f.name.clone().into()).collect();
        compare::ensure_equal(
            &Value::Array(expected_names),
            &Value::Array(actual_names),
            "checking names of fields",
        )?;

        // Declared-name string comparison, order-sensitive.
        let expected_types: Vec<Value> = expected.iter().map(|(_, t)| t.clone().into()).collect();
        let actual_types: Vec<Value> = actual.iter().map(|f| f.type_name.clone().into()).collect();
        compare::ensure_equal(
            &Value::Array(expected_types),
            &Value::Array(actual_types),
            "checking types of fields",
        )
    }

    async fn check_functions(&self, suite: &UnitTestSuite) -> Result<()> {
        for function_name in &suite.function_order {
            // Absence is reported before any case is run.
            let function = self.registry.lookup_function(function_name).ok_or_else(|| {
                HarnessError::MissingMember {
                    kind: MemberKind::Function,
                    name: function_name.to_string(),
                }
            })?;

            let role = self.roles.role_of(function_name).ok_or_else(|| {
                HarnessError::Schema(format!(
                    "no calling role declared for function <<{function_name}>>"
                ))
            })?;

            for case in suite.cases(function_name)? {
                self.run_case(suite, function_name, &function, role, case)
                    .await?;
            }
        }
        Ok(())
    }

    async fn run_case(
        &self,
        suite: &UnitTestSuite,
        function_name: &str,
        function: &SolutionFunction,
        role: FunctionRole,
        case: &UnitCase,
    ) -> Result<()> {
        let (arguments, expected) = build_invocation(suite, function, role, case)?;

        let outcome = invoke::invoke_blocking(function.call.clone(), arguments, case.limit).await;

        if outcome.timed_out {
            return Err(HarnessError::Timeout {
                function: function_name.to_string(),
                limit: case.limit,
            });
        }

        match outcome.value {
            Some(actual) => {
                compare::ensure_equal(&expected, &actual, "checking the returned value")
            }
            None => {
                let message = outcome.fault.unwrap_or_else(|| "unknown fault".to_string());
                Err(HarnessError::Fault(report::wrap_fault(
                    function_name,
                    &message,
                )))
            }
        }
    }
}

/// Build call arguments and the expected result for one case, according to
/// the function's role.
fn build_invocation(
    suite: &UnitTestSuite,
    function: &SolutionFunction,
    role: FunctionRole,
    case: &UnitCase,
) -> Result<(Map<String, Value>, Value)> {
    match role {
        FunctionRole::Parse => {
            let expected = build_record(suite, &case.output)?;
            Ok((case.input.clone(), expected))
        }
        FunctionRole::Format => {
            let param = first_param(function)?;
            let raw = case_argument(case, param)?;
            let mut arguments = Map::new();
            arguments.insert(param.to_string(), build_record(suite, raw)?);
            Ok((arguments, case.output.clone()))
        }
        FunctionRole::Order => {
            let param = first_param(function)?;
            let raw = case_argument(case, param)?;
            let mut arguments = Map::new();
            arguments.insert(param.to_string(), build_record_sequence(suite, raw)?);
            let expected = build_record_sequence(suite, &case.output)?;
            Ok((arguments, expected))
        }
    }
}

fn first_param(function: &SolutionFunction) -> Result<&str> {
    function.first_param().ok_or_else(|| {
        HarnessError::Schema("candidate function declares no parameters".to_string())
    })
}

fn case_argument<'v>(case: &'v UnitCase, param: &str) -> Result<&'v Value> {
    case.input.get(param).ok_or_else(|| {
        HarnessError::Schema(format!("case declares no argument for parameter <<{param}>>"))
    })
}

/// Construct a primary-record instance from named fields, validating the
/// field set against the declared schema and normalizing field order.
fn build_record(suite: &UnitTestSuite, fields: &Value) -> Result<Value> {
    let primary = suite.primary_type()?;
    let schema = suite.type_schema(primary)?;
    let given = fields.as_object().ok_or_else(|| {
        HarnessError::Schema(format!(
            "cannot construct <<{primary}>> from a non-object value"
        ))
    })?;

    if given.len() != schema.len() {
        return Err(HarnessError::Schema(format!(
            "cannot construct <<{primary}>>: expected {} fields, got {}",
            schema.len(),
            given.len()
        )));
    }

    let mut record = Map::with_capacity(schema.len());
    for (field, _) in &schema {
        let value = given.get(field).ok_or_else(|| {
            HarnessError::Schema(format!(
                "cannot construct <<{primary}>>: missing field <<{field}>>"
            ))
        })?;
        record.insert(field.clone(), value.clone());
    }
    Ok(Value::Object(record))
}

fn build_record_sequence(suite: &UnitTestSuite, elements: &Value) -> Result<Value> {
    let items = elements.as_array().ok_or_else(|| {
        HarnessError::Schema("expected a sequence of record field maps".to_string())
    })?;
    let records = items
        .iter()
        .map(|item| build_record(suite, item))
        .collect::<Result<Vec<Value>>>()?;
    Ok(Value::Array(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FieldDescriptor;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    /// Registry over a two-field record with the canonical vocabulary:
    /// parse "a;b", format "b a", order ascending by `a`.
    struct PairSolution {
        field_order: Vec<(&'static str, &'static str)>,
        missing_function: bool,
        wrong_format: bool,
        slow: bool,
    }

    impl Default for PairSolution {
        fn default() -> Self {
            Self {
                field_order: vec![("a", "int"), ("b", "str")],
                missing_function: false,
                wrong_format: false,
                slow: false,
            }
        }
    }

    impl SolutionRegistry for PairSolution {
        fn describe_type(&self, name: &str) -> Option<Vec<FieldDescriptor>> {
            (name == "Pair").then(|| {
                self.field_order
                    .iter()
                    .map(|(n, t)| FieldDescriptor::new(*n, *t))
                    .collect()
            })
        }

        fn lookup_function(&self, name: &str) -> Option<SolutionFunction> {
            if self.missing_function {
                return None;
            }
            match name {
                "from_line" => Some(SolutionFunction::new(
                    &["line"],
                    Arc::new(|args| {
                        let line = args["line"].as_str().unwrap_or_default();
                        let (a, b) = line.split_once(';').unwrap_or(("0", ""));
                        Ok(json!({"a": a.parse::<i64>()?, "b": b}))
                    }),
                )),
                "to_line" => {
                    let wrong = self.wrong_format;
                    Some(SolutionFunction::new(
                        &["pair"],
                        Arc::new(move |args| {
                            let pair = &args["pair"];
                            let a = pair["a"].as_i64().unwrap_or_default();
                            let b = pair["b"].as_str().unwrap_or_default();
                            if wrong {
                                Ok(json!(format!("{a} {b}")))
                            } else {
                                Ok(json!(format!("{b} {a}")))
                            }
                        }),
                    ))
                }
                // `shuffle` is exposed under an alias to exercise role lookup.
                "order" | "shuffle" => {
                    let slow = self.slow;
                    Some(SolutionFunction::new(
                        &["pairs"],
                        Arc::new(move |args| {
                            if slow {
                                std::thread::sleep(Duration::from_millis(200));
                            }
                            let mut pairs = args["pairs"].as_array().cloned().unwrap_or_default();
                            pairs.sort_by_key(|p| p["a"].as_i64().unwrap_or_default());
                            Ok(Value::Array(pairs))
                        }),
                    ))
                }
                _ => None,
            }
        }
    }

    fn suite() -> UnitTestSuite {
        serde_json::from_value(json!({
            "type-order": ["Pair"],
            "types": {"Pair": {"a": "int", "b": "str"}},
            "function-order": ["from_line", "to_line", "order"],
            "functions": {
                "from_line": [
                    {"in": {"line": "1;x"}, "out": {"a": 1, "b": "x"}, "limit": 1.0}
                ],
                "to_line": [
                    {"in": {"pair": {"a": 1, "b": "x"}}, "out": "x 1", "limit": 1.0}
                ],
                "order": [
                    {
                        "in": {"pairs": [{"a": 2, "b": "y"}, {"a": 1, "b": "x"}]},
                        "out": [{"a": 1, "b": "x"}, {"a": 2, "b": "y"}],
                        "limit": 1.0
                    }
                ]
            }
        }))
        .unwrap()
    }

    fn runner<'a>(store: &'a FixtureStore, registry: &'a PairSolution) -> UnitTestRunner<'a, PairSolution> {
        UnitTestRunner::new(store, registry)
    }

    #[tokio::test]
    async fn test_conforming_solution_passes() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution::default();
        assert!(runner(&store, &registry).check_suite(&suite()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_function_is_distinct_fault() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution {
            missing_function: true,
            ..Default::default()
        };
        let err = runner(&store, &registry)
            .check_suite(&suite())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::MissingMember {
                kind: MemberKind::Function,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_field_order_mismatch_is_schema_fault() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution {
            field_order: vec![("b", "str"), ("a", "int")],
            ..Default::default()
        };
        let err = runner(&store, &registry)
            .check_suite(&suite())
            .await
            .unwrap_err();
        match err {
            HarnessError::Schema(msg) => {
                assert!(msg.contains("UNIT TESTING Pair"));
                assert!(msg.contains("checking names of fields"));
            }
            other => panic!("expected schema fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_return_value_names_the_check() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution {
            wrong_format: true,
            ..Default::default()
        };
        let err = runner(&store, &registry)
            .check_suite(&suite())
            .await
            .unwrap_err();
        match err {
            HarnessError::OutputMismatch(msg) => {
                assert!(msg.contains("checking the returned value"));
                assert!(msg.contains("x 1"));
                assert!(msg.contains("1 x"));
            }
            other => panic!("expected output mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_function_times_out_with_name_and_limit() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution {
            slow: true,
            ..Default::default()
        };
        let mut slow_suite = suite();
        for case in slow_suite.functions.get_mut("order").unwrap() {
            case.limit = 0.05;
        }

        let err = runner(&store, &registry)
            .check_suite(&slow_suite)
            .await
            .unwrap_err();
        match err {
            HarnessError::Timeout { function, limit } => {
                assert_eq!(function, "order");
                assert_eq!(limit, 0.05);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_function_role_is_schema_fault() {
        let store = FixtureStore::new().unwrap();
        let registry = PairSolution::default();
        let mut odd_suite = suite();
        odd_suite.function_order = vec!["shuffle".to_string()];
        odd_suite
            .functions
            .insert("shuffle".to_string(), Vec::new());

        // The registry exposes `shuffle`, but no role is declared for it.
        let err = runner(&store, &registry)
            .check_suite(&odd_suite)
            .await
            .unwrap_err();
        match err {
            HarnessError::Schema(msg) => assert!(msg.contains("shuffle")),
            other => panic!("expected schema fault, got {other:?}"),
        }

        // An alias entry in the role table makes the same suite pass.
        let roles = RoleTable::standard().with_role("shuffle", FunctionRole::Order);
        odd_suite.functions.insert(
            "shuffle".to_string(),
            suite().functions.remove("order").unwrap(),
        );
        assert!(UnitTestRunner::new(&store, &registry)
            .with_roles(roles)
            .check_suite(&odd_suite)
            .await
            .is_ok());
    }

    #[test]
    fn test_build_record_normalizes_field_order() {
        let suite = suite();
        let record = build_record(&suite, &json!({"b": "x", "a": 1})).unwrap();
        let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_build_record_rejects_missing_field() {
        let suite = suite();
        let err = build_record(&suite, &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, HarnessError::Schema(_)));
    }
}

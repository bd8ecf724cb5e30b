//! Remote content store access
//!
//! One blocking GET per fixture against deterministic URLs built from the
//! exercise identifier (its last two characters form the variant suffix,
//! the rest the family identifier) and the test identifier. No retries:
//! a single failed fetch aborts the whole grading run.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::fixtures::{TestCase, TestConfiguration, UnitTestSuite};

/// Base path of the exercise content store.
pub const MASTER_URL: &str =
    "https://raw.githubusercontent.com/INBGM0212-2023/exercises/main/week-08/P1081";

/// Fetches configuration, test cases, and unit suites for one exercise.
pub struct FixtureStore {
    client: Client,
    base_url: String,
}

impl FixtureStore {
    /// Create a store against the compiled-in content store URL.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HarnessError::Fetch {
                url: MASTER_URL.to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: MASTER_URL.to_string(),
        })
    }

    /// Override the base URL (used by tests against a local server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// `{base}/{family}/test.json`
    pub async fn fetch_configuration(&self, exercise_id: &str) -> Result<TestConfiguration> {
        let (family, _) = split_exercise_id(exercise_id)?;
        let url = format!("{}/{family}/test.json", self.base_url);
        let body = self.get_text(&url).await?;
        parse_configuration(&body, &url)
    }

    /// `{base}/{family}/{test_id}/test{suffix}.in` and `test.out`
    pub async fn fetch_test_case(&self, exercise_id: &str, test_id: &str) -> Result<TestCase> {
        let (family, suffix) = split_exercise_id(exercise_id)?;
        let stem = format!("{}/{family}/{test_id}/test", self.base_url);

        let input = self.get_text(&format!("{stem}{suffix}.in")).await?;
        let expected = self.get_text(&format!("{stem}.out")).await?;

        Ok(TestCase { input, expected })
    }

    /// `{base}/{family}/{test_id}/test.json`
    pub async fn fetch_unit_suite(&self, exercise_id: &str, test_id: &str) -> Result<UnitTestSuite> {
        let (family, _) = split_exercise_id(exercise_id)?;
        let url = format!("{}/{family}/{test_id}/test.json", self.base_url);
        let body = self.get_text(&url).await?;
        parse_unit_suite(&body, &url)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("fetching {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarnessError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarnessError::Fetch {
                url: url.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }

        response.text().await.map_err(|e| HarnessError::Fetch {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })
    }
}

/// Family identifier and variant suffix of one exercise identifier.
///
/// Identifiers come from directory names, so the cut two characters from
/// the end must land on a character boundary, not a byte offset.
fn split_exercise_id(exercise_id: &str) -> Result<(&str, &str)> {
    let cut = exercise_id
        .char_indices()
        .rev()
        .nth(1)
        .map(|(index, _)| index)
        .filter(|&index| index > 0)
        .ok_or_else(|| {
            HarnessError::Schema(format!(
                "exercise identifier <<{exercise_id}>> is too short to carry a variant suffix"
            ))
        })?;
    Ok(exercise_id.split_at(cut))
}

/// Exercise identifier derived from the enclosing directory: the name of
/// the working directory's parent.
pub fn exercise_id_from_cwd() -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    cwd.parent()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// Parse a configuration body, distinguishing a missing top-level key
/// (schema fault) from an otherwise malformed body (fetch fault).
pub fn parse_configuration(body: &str, url: &str) -> Result<TestConfiguration> {
    let raw = parse_json(body, url)?;
    require_keys(&raw, &["tests", "timeout-cmd"], url)?;
    serde_json::from_value(raw).map_err(|e| HarnessError::Fetch {
        url: url.to_string(),
        reason: format!("malformed configuration: {e}"),
    })
}

/// Parse a unit-suite body with the same key/shape split as configurations.
pub fn parse_unit_suite(body: &str, url: &str) -> Result<UnitTestSuite> {
    let raw = parse_json(body, url)?;
    require_keys(
        &raw,
        &["type-order", "types", "function-order", "functions"],
        url,
    )?;
    serde_json::from_value(raw).map_err(|e| HarnessError::Fetch {
        url: url.to_string(),
        reason: format!("malformed unit suite: {e}"),
    })
}

fn parse_json(body: &str, url: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| HarnessError::Fetch {
        url: url.to_string(),
        reason: format!("body is not valid JSON: {e}"),
    })
}

fn require_keys(raw: &Value, keys: &[&str], url: &str) -> Result<()> {
    let object = raw.as_object().ok_or_else(|| {
        HarnessError::Schema(format!("fixture at {url} is not a JSON object"))
    })?;
    for key in keys {
        if !object.contains_key(*key) {
            return Err(HarnessError::Schema(format!(
                "fixture at {url} is missing key <<{key}>>"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exercise_id() {
        let (family, suffix) = split_exercise_id("P108104").unwrap();
        assert_eq!(family, "P1081");
        assert_eq!(suffix, "04");
    }

    #[test]
    fn test_split_exercise_id_too_short() {
        assert!(split_exercise_id("04").is_err());
        assert!(split_exercise_id("€4").is_err());
    }

    #[test]
    fn test_split_exercise_id_multibyte_suffix() {
        let (family, suffix) = split_exercise_id("ab€").unwrap();
        assert_eq!(family, "a");
        assert_eq!(suffix, "b€");

        let (family, suffix) = split_exercise_id("P1081€4").unwrap();
        assert_eq!(family, "P1081");
        assert_eq!(suffix, "€4");
    }

    #[test]
    fn test_parse_configuration() {
        let body = r#"{"tests": ["01", "02"], "timeout-cmd": "2.0"}"#;
        let conf = parse_configuration(body, "http://test/test.json").unwrap();
        assert_eq!(conf.tests, vec!["01", "02"]);
        assert_eq!(conf.timeout_cmd, 2.0);
    }

    #[test]
    fn test_parse_configuration_missing_key_is_schema_fault() {
        let body = r#"{"tests": ["01"]}"#;
        let err = parse_configuration(body, "http://test/test.json").unwrap_err();
        assert!(matches!(err, HarnessError::Schema(_)));
    }

    #[test]
    fn test_parse_configuration_bad_json_is_fetch_fault() {
        let err = parse_configuration("not json", "http://test/test.json").unwrap_err();
        assert!(matches!(err, HarnessError::Fetch { .. }));
    }

    #[test]
    fn test_parse_unit_suite() {
        let body = r#"{
            "type-order": ["LegoSet"],
            "types": {"LegoSet": {"number": "int", "name": "str", "theme": "str", "pieces": "int"}},
            "function-order": ["from_line"],
            "functions": {"from_line": [{"in": {"line": "1;a;b;2"}, "out": {}, "limit": 1.0}]}
        }"#;
        let suite = parse_unit_suite(body, "http://test/01/test.json").unwrap();
        assert_eq!(suite.type_order, vec!["LegoSet"]);
        assert_eq!(suite.function_order, vec!["from_line"]);
        assert_eq!(suite.cases("from_line").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_unit_suite_missing_functions_key() {
        let body = r#"{"type-order": [], "types": {}, "function-order": []}"#;
        let err = parse_unit_suite(body, "http://test/01/test.json").unwrap_err();
        assert!(matches!(err, HarnessError::Schema(_)));
    }

    /// Serve one request with the given body, returning the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "{status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_with_base_url_fetches_from_the_override() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"tests": ["01", "02"], "timeout-cmd": "2.0"}"#,
        )
        .await;

        let store = FixtureStore::new().unwrap().with_base_url(base);
        let conf = store.fetch_configuration("P108104").await.unwrap();
        assert_eq!(conf.tests, vec!["01", "02"]);
        assert_eq!(conf.timeout_cmd, 2.0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_fault() {
        let base = serve_once("HTTP/1.1 404 Not Found", "missing").await;

        let store = FixtureStore::new().unwrap().with_base_url(base);
        let err = store.fetch_configuration("P108104").await.unwrap_err();
        match err {
            HarnessError::Fetch { url, reason } => {
                assert!(url.ends_with("/P1081/test.json"));
                assert!(reason.contains("404"));
            }
            other => panic!("expected fetch fault, got {other:?}"),
        }
    }
}

//! Subprocess bounded invocation
//!
//! Runs the candidate as an isolated child process with piped stdio. The
//! child inherits nothing from the harness beyond its command line; all
//! communication goes through stdin/stdout/stderr. `kill_on_drop` covers
//! every exit path, including the timeout branch where the wait future is
//! dropped.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Result of one bounded subprocess run.
#[derive(Clone, Debug)]
pub struct ProcessOutcome {
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn exited_zero(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run `program args…`, feed `input` on stdin, and wait up to `limit`
/// seconds. On expiry the child is killed and the outcome marked timed out.
pub async fn run_process(
    program: &str,
    args: &[String],
    input: &str,
    limit: f64,
) -> Result<ProcessOutcome> {
    debug!("spawning candidate process: {program} {args:?}");

    let budget = Duration::try_from_secs_f64(limit).map_err(|_| {
        HarnessError::Schema(format!("invalid command-level timeout: {limit}"))
    })?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HarnessError::Process(format!("failed to spawn <<{program}>>: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .await
            .map_err(|e| HarnessError::Process(format!("failed to write candidate stdin: {e}")))?;
        // Dropping stdin closes the pipe so the child sees end-of-input.
    }

    match timeout(budget, child.wait_with_output()).await {
        // Dropping the wait future kills the child via kill_on_drop.
        Err(_) => Ok(ProcessOutcome {
            timed_out: true,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        }),
        Ok(Err(e)) => Err(HarnessError::Process(format!(
            "failed to wait for candidate process: {e}"
        ))),
        Ok(Ok(output)) => Ok(ProcessOutcome {
            timed_out: false,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_process_echoes_stdin() {
        let outcome = run_process("cat", &[], "10;Castle;City;500\n", 2.0)
            .await
            .unwrap();
        assert!(!outcome.timed_out);
        assert!(outcome.exited_zero());
        assert_eq!(outcome.stdout, "10;Castle;City;500\n");
    }

    #[tokio::test]
    async fn test_process_nonzero_exit_is_reported() {
        let outcome = run_process("sh", &["-c".to_string(), "echo oops >&2; exit 3".to_string()], "", 2.0)
            .await
            .unwrap();
        assert!(!outcome.timed_out);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_process_over_limit_is_killed() {
        let outcome = run_process("sleep", &["5".to_string()], "", 0.1).await.unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, None);
    }

    #[tokio::test]
    async fn test_missing_program_is_process_fault() {
        let err = run_process("no-such-candidate-binary", &[], "", 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Process(_)));
    }
}

//! In-process bounded invocation
//!
//! The candidate callable runs on a `spawn_blocking` task. When the limit
//! elapses the join is abandoned: the thread may keep running, but its
//! result is discarded and never observed. Arguments and results are owned
//! values, so an abandoned callable cannot mutate harness state.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time::timeout;

/// A candidate function: named JSON arguments in, JSON value out.
pub type Callable = Arc<dyn Fn(Map<String, Value>) -> anyhow::Result<Value> + Send + Sync>;

/// Result of one bounded in-process invocation.
///
/// `timed_out` excludes the other two fields; otherwise exactly one of
/// `value` and `fault` is set.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub timed_out: bool,
    pub value: Option<Value>,
    pub fault: Option<String>,
}

impl Outcome {
    pub fn success(value: Value) -> Self {
        Self {
            timed_out: false,
            value: Some(value),
            fault: None,
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            timed_out: false,
            value: None,
            fault: Some(message.into()),
        }
    }

    pub fn expired() -> Self {
        Self {
            timed_out: true,
            value: None,
            fault: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Invoke `call(arguments)` under `limit` seconds of wall-clock budget.
///
/// Candidate panics are captured into the fault field rather than
/// propagated; no outcome path unwinds into the caller.
pub async fn invoke_blocking(call: Callable, arguments: Map<String, Value>, limit: f64) -> Outcome {
    let budget = match Duration::try_from_secs_f64(limit) {
        Ok(budget) => budget,
        Err(_) => return Outcome::fault(format!("invalid time limit: {limit}")),
    };

    let handle = task::spawn_blocking(move || call(arguments));

    match timeout(budget, handle).await {
        // Join abandoned; the blocking thread may still be running.
        Err(_) => Outcome::expired(),
        Ok(Err(join_error)) => {
            if join_error.is_panic() {
                Outcome::fault(panic_message(join_error.into_panic()))
            } else {
                Outcome::fault("candidate task was cancelled")
            }
        }
        Ok(Ok(Ok(value))) => Outcome::success(value),
        Ok(Ok(Err(fault))) => Outcome::fault(fault.to_string()),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("candidate panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("candidate panicked: {s}")
    } else {
        "candidate panicked".to_string()
    }
}

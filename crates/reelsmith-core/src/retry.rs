//! Generic retry loop with linear backoff.
//!
//! Every agent call goes through `invoke_with_retry`. The policy is fixed:
//!
//!   attempt 1 → fail → sleep 1×base → attempt 2 → fail → sleep 2×base → …
//!
//! Every error is retried the same way. When the budget is spent the last
//! error is returned unchanged.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use reelsmith_contracts::{
    agent::AgentConfig,
    error::{ReelsmithError, ReelsmithResult},
};

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on calls to the operation.
    pub max_attempts: u32,
    /// Delay unit. The wait after failed attempt `k` is `k * base_delay`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::linear(
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_millis(1000))
    }
}

/// A successful result and the number of attempts it took.
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Run `operation` until it succeeds or `policy.max_attempts` calls have failed.
///
/// `operation` receives the 1-indexed attempt number. `agent` and `task` label
/// log events and the error returned when the budget is zero.
pub async fn invoke_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    agent: &str,
    task: &str,
    mut operation: F,
) -> ReelsmithResult<Retried<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ReelsmithResult<T>>,
{
    let mut last_error: Option<ReelsmithError> = None;

    for attempt in 1..=policy.max_attempts {
        debug!(
            agent = %agent,
            attempt,
            max_attempts = policy.max_attempts,
            "attempt starting"
        );
        let started = Instant::now();

        match operation(attempt).await {
            Ok(value) => {
                debug!(
                    agent = %agent,
                    attempt,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "attempt succeeded"
                );
                return Ok(Retried {
                    value,
                    attempts: attempt,
                });
            }
            Err(error) => {
                warn!(
                    agent = %agent,
                    attempt,
                    max_attempts = policy.max_attempts,
                    latency_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "attempt failed"
                );
                last_error = Some(error);

                if attempt < policy.max_attempts {
                    let delay = policy.delay_after(attempt);
                    debug!(
                        agent = %agent,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "backing off before next attempt"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ReelsmithError::RetriesExhausted {
        agent: agent.to_string(),
        task: task.to_string(),
    }))
}

// ── Tests ────────────────────────────────────────────────────────────────────

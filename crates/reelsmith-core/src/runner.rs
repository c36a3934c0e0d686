//! The agent runner: one retry-governed, schema-validated model call.
//!
//! Each call to `AgentRunner::run` follows the same pipeline:
//!
//!   Prompt → Request → [Client → Trim → Parse → Verify → Repackage]×retries → Record
//!
//! The bracketed part is one attempt. Any failure inside it (client error,
//! unparseable text, failed verification, repackaging error) fails the whole
//! attempt and is retried under the agent's `RetryPolicy`. The caller gets
//! either the output of the first successful attempt or the last error.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use reelsmith_contracts::{
    agent::{CallerIdentity, InvocationId},
    error::{ReelsmithError, ReelsmithResult},
    invocation::{InvocationOutcome, InvocationRecord},
    model::{InvocationOptions, ModelRequest},
    verify::OutputSchema,
};

use crate::{
    retry::{invoke_with_retry, RetryPolicy},
    traits::{ModelClient, StructuredAgent, UsageRecorder, Verifier},
};

/// Runs `StructuredAgent`s against a model client.
///
/// Cheap to clone; all components are shared. One runner can serve any number
/// of concurrent invocations since it holds no per-call state.
#[derive(Clone)]
pub struct AgentRunner {
    client: Arc<dyn ModelClient>,
    verifier: Option<Arc<dyn Verifier>>,
    recorder: Option<Arc<dyn UsageRecorder>>,
    caller: CallerIdentity,
}

impl AgentRunner {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            verifier: None,
            recorder: None,
            caller: CallerIdentity::default(),
        }
    }

    /// Check every parsed output against the agent's schema before
    /// repackaging it.
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn UsageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_caller(mut self, caller: CallerIdentity) -> Self {
        self.caller = caller;
        self
    }

    /// Invoke `agent` on `input`.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once the agent's
    /// `max_retries` attempts have all failed, or `RetriesExhausted` when the
    /// budget is zero. Usage-recording failures are logged, never returned.
    pub async fn run<A: StructuredAgent>(
        &self,
        agent: &A,
        input: &A::Input,
    ) -> ReelsmithResult<A::Output> {
        let invocation_id = InvocationId::new();
        let config = agent.config();
        let policy = RetryPolicy::from_config(config);
        let schema = agent.schema(input);

        let prompt = agent.build_prompt(input);
        let request = ModelRequest::structured(
            config,
            &prompt,
            &schema.name,
            &schema.json_schema,
            &self.caller,
        );
        let options = InvocationOptions {
            expected_output_tokens: config.expected_output_tokens,
            metadata: Some(json!({
                "agent": agent.id().as_str(),
                "invocation_id": invocation_id.to_string(),
            })),
        };

        info!(
            invocation_id = %invocation_id,
            agent = %agent.id(),
            provider = %config.provider,
            model = %config.model,
            multimodal = prompt.user_prompt.is_multimodal(),
            input = %agent.describe_input(input),
            "agent invocation starting"
        );

        let started_at = Utc::now();
        let clock = Instant::now();
        let spend = Spend::default();
        let request = &request;
        let options = &options;
        let spend_ref = &spend;

        let result = invoke_with_retry(&policy, agent.id().as_str(), agent.task(), move |_| {
            self.attempt(agent, input, schema, request, options, spend_ref)
        })
        .await;

        let latency_ms = clock.elapsed().as_millis() as u64;
        let cost_usd = spend.total();

        let (outcome, attempts) = match &result {
            Ok(retried) => {
                info!(
                    invocation_id = %invocation_id,
                    agent = %agent.id(),
                    attempts = retried.attempts,
                    latency_ms,
                    cost_usd = cost_usd.unwrap_or(0.0),
                    output = %agent.describe_output(&retried.value),
                    "agent invocation succeeded"
                );
                (InvocationOutcome::Succeeded, retried.attempts)
            }
            Err(error) => {
                warn!(
                    invocation_id = %invocation_id,
                    agent = %agent.id(),
                    attempts = policy.max_attempts,
                    latency_ms,
                    cost_usd = cost_usd.unwrap_or(0.0),
                    error = %error,
                    "agent invocation failed"
                );
                (
                    InvocationOutcome::Failed {
                        reason: error.to_string(),
                    },
                    policy.max_attempts,
                )
            }
        };

        if let Some(recorder) = &self.recorder {
            let record = InvocationRecord {
                invocation_id: invocation_id.clone(),
                agent_id: agent.id().clone(),
                provider: config.provider.clone(),
                model: config.model.clone(),
                attempts,
                outcome,
                cost_usd,
                latency_ms,
                started_at,
            };
            if let Err(error) = recorder.record(&record) {
                warn!(
                    invocation_id = %invocation_id,
                    agent = %agent.id(),
                    error = %error,
                    "usage record dropped"
                );
            }
        }

        result.map(|retried| retried.value)
    }

    /// One call-parse-verify-repackage pass. The response cost lands in
    /// `spend` as soon as the client answers, so a billed reply that later
    /// fails parsing or verification is still accounted for.
    async fn attempt<A: StructuredAgent>(
        &self,
        agent: &A,
        input: &A::Input,
        schema: &OutputSchema,
        request: &ModelRequest,
        options: &InvocationOptions,
        spend: &Spend,
    ) -> ReelsmithResult<A::Output> {
        let response = self.client.invoke(request, options).await?;
        let cost = response.cost();
        spend.add(cost);

        let text = response.output.trim();
        let parsed: Value =
            serde_json::from_str(text).map_err(|e| ReelsmithError::MalformedOutput {
                reason: format!("response is not valid JSON: {e}"),
            })?;

        if let Some(verifier) = &self.verifier {
            let report = verifier.verify(&parsed, schema)?;
            if !report.passed {
                return Err(ReelsmithError::VerificationFailed {
                    reason: report.summary(),
                });
            }
            debug!(agent = %agent.id(), schema = %schema.name, "output verified");
        }

        agent.build_output(input, parsed, cost)
    }
}

/// Running total of what the provider billed across the attempts of one
/// invocation. `None` until some response reports a cost.
#[derive(Default)]
struct Spend(Mutex<Option<f64>>);

impl Spend {
    fn add(&self, cost: Option<f64>) {
        if let Some(cost) = cost {
            let mut total = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            *total = Some(total.unwrap_or(0.0) + cost);
        }
    }

    fn total(&self) -> Option<f64> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

//! Core trait definitions for the REELSMITH invocation pipeline.
//!
//! These four traits define every seam of an agent call:
//!
//! - `ModelClient`: the hosted model, reached over some transport
//! - `StructuredAgent`: prompt template, output schema, and repackaging
//! - `Verifier`: client-side check of the parsed JSON
//! - `UsageRecorder`: sink for one record per invocation
//!
//! `AgentRunner` wires them together and owns the retry loop.

use async_trait::async_trait;
use serde_json::Value;

use reelsmith_contracts::{
    agent::{AgentConfig, AgentId},
    error::ReelsmithResult,
    invocation::InvocationRecord,
    model::{InvocationOptions, ModelRequest, ModelResponse},
    prompt::PromptPair,
    verify::{OutputSchema, VerificationReport},
};

/// A hosted generative-text model.
///
/// Implementations may fail for any reason (transport, provider status,
/// unreadable body). The runner retries every failure the same way, so
/// implementations should not retry internally.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one model call and return its text output and usage.
    async fn invoke(
        &self,
        request: &ModelRequest,
        options: &InvocationOptions,
    ) -> ReelsmithResult<ModelResponse>;
}

/// One prompt-and-parse unit.
///
/// Everything an agent does is pure: build a prompt from its input, name the
/// schema the answer must satisfy, and turn the parsed JSON into its typed
/// output. The runner does all I/O.
pub trait StructuredAgent: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    /// Stable identifier, used for settings lookups, logs, and usage records.
    fn id(&self) -> &AgentId;

    /// Verb phrase describing the work, e.g. "generate platform metadata".
    /// Appears in the error returned when no attempt could run.
    fn task(&self) -> &'static str;

    fn config(&self) -> &AgentConfig;

    /// The schema the model's answer to `input` must satisfy.
    fn schema(&self, input: &Self::Input) -> &OutputSchema;

    /// Build the system and user instructions for `input`.
    ///
    /// Must be deterministic: the same input always yields the same strings.
    fn build_prompt(&self, input: &Self::Input) -> PromptPair;

    /// Repackage the parsed model output into the agent's result type.
    ///
    /// An error here is treated like any other failed attempt and retried.
    fn build_output(
        &self,
        input: &Self::Input,
        parsed: Value,
        cost: Option<f64>,
    ) -> ReelsmithResult<Self::Output>;

    /// Short summary of the input for log lines.
    fn describe_input(&self, input: &Self::Input) -> String;

    /// Short summary of the output for log lines.
    fn describe_output(&self, _output: &Self::Output) -> String {
        String::new()
    }
}

/// Client-side output checker.
///
/// Inspects the parsed JSON against the same `OutputSchema` that was sent to
/// the provider. A failing report turns the attempt into a retryable error.
pub trait Verifier: Send + Sync {
    fn verify(&self, output: &Value, schema: &OutputSchema) -> ReelsmithResult<VerificationReport>;
}

/// Sink for invocation accounting.
///
/// Receives exactly one record per `AgentRunner::run` call.
pub trait UsageRecorder: Send + Sync {
    fn record(&self, record: &InvocationRecord) -> ReelsmithResult<()>;
}

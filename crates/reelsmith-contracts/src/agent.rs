//! Agent identity and configuration types.
//!
//! An agent in REELSMITH is a single prompt-and-parse unit, not a stateful
//! actor. These types describe which agent is running and how it reaches its
//! model; they never change once the agent is constructed.

use serde::{Deserialize, Serialize};

/// Stable, human-readable identifier for an agent type.
///
/// Used as the key for settings overrides, log fields, and usage records.
/// Example: AgentId("platform-metadata")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a single agent invocation.
///
/// One is minted per `AgentRunner::run` call and appears in every log event
/// and usage record that call produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub uuid::Uuid);

impl InvocationId {
    /// Create a new, unique invocation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default linear backoff unit between attempts, in milliseconds.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Static per-agent model configuration.
///
/// Each agent module exposes a built-in value; a settings file may override
/// individual fields before the agent is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Provider name the model client routes on (e.g. "openai").
    pub provider: String,
    /// Provider-specific model identifier.
    pub model: String,
    /// Sampling temperature. `None` leaves the provider default in place,
    /// which reasoning models require.
    pub temperature: Option<f32>,
    /// Upper bound on model calls per invocation.
    pub max_retries: u32,
    /// Reasoning effort hint for models that accept one ("low", "medium", "high").
    pub reasoning_effort: Option<String>,
    /// Rough size of the expected answer, forwarded to the client for
    /// budgeting and logging.
    pub expected_output_tokens: u32,
    /// Delay unit for linear backoff: attempt `k` waits `k * backoff_base_ms`.
    pub backoff_base_ms: u64,
}

impl AgentConfig {
    /// Build a config with the standard retry budget (3) and backoff unit (1s).
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            temperature: None,
            max_retries: 3,
            reasoning_effort: None,
            expected_output_tokens: 1024,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = Some(effort.into());
        self
    }

    pub fn with_expected_output_tokens(mut self, tokens: u32) -> Self {
        self.expected_output_tokens = tokens;
        self
    }

    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }
}

/// Who the call is made on behalf of. Forwarded to the model client so the
/// hosting application can attribute usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
}

//! Settings document schema.
//!
//! A `Settings` value is deserialized from TOML and holds three tables:
//! fleet-wide agent defaults, provider connection details, and per-agent
//! overrides keyed by agent id. Every field is optional so a file only needs
//! to name what it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Partial `AgentConfig`: any field left out keeps the value from the layer
/// below it.
///
/// Used both for `[defaults]` and for each `[agents.<id>]` table.
///
/// Example in TOML:
/// ```toml
/// [agents.platform-metadata]
/// model = "gpt-4.1-mini"
/// temperature = 0.9
/// max_retries = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentOverride {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_retries: Option<u32>,
    pub reasoning_effort: Option<String>,
    pub expected_output_tokens: Option<u32>,
    pub backoff_base_ms: Option<u64>,
}

/// Connection and pricing details for one provider.
///
/// Example in TOML:
/// ```toml
/// [providers.openai]
/// base_url = "https://api.openai.com/v1"
/// api_key_env = "OPENAI_API_KEY"
/// input_cost_per_million = 0.40
/// output_cost_per_million = 1.60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// API root; the client appends `/responses`.
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// USD per million input tokens. Zero disables cost reporting for input.
    #[serde(default)]
    pub input_cost_per_million: f64,

    /// USD per million output tokens.
    #[serde(default)]
    pub output_cost_per_million: f64,

    /// Whole-request timeout for the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

/// The top-level structure deserialized from a settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Applied to every agent before its own override.
    #[serde(default)]
    pub defaults: AgentOverride,

    /// Providers by name, matching `AgentConfig::provider`.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,

    /// Per-agent overrides keyed by agent id.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentOverride>,
}

//! Model invocation request and response types.
//!
//! These mirror the shape every provider adapter accepts: a provider name, a
//! model name, and a payload of role-tagged messages with an optional
//! structured-output format. Adapters translate them to the wire format of
//! their provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    agent::{AgentConfig, CallerIdentity},
    prompt::{MessageContent, PromptPair},
};

/// Role of a message in the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// Structured-output format requested from the provider.
///
/// Always `type = "json_schema"` with `strict = true` when built through
/// `ResponseFormat::json_schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            kind: "json_schema".to_string(),
            name: name.into(),
            strict: true,
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub format: ResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reasoning {
    pub effort: String,
}

/// Provider-specific payload of a model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
    pub input: Vec<InputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextOptions>,
}

/// A complete model call as handed to a `ModelClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub provider: String,
    pub model: String,
    pub payload: ModelPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl ModelRequest {
    /// Assemble the request for one agent call: system then user message,
    /// with the output schema attached for strict structured decoding.
    pub fn structured(
        config: &AgentConfig,
        prompt: &PromptPair,
        schema_name: &str,
        schema: &Value,
        caller: &CallerIdentity,
    ) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            payload: ModelPayload {
                temperature: config.temperature,
                reasoning: config
                    .reasoning_effort
                    .as_ref()
                    .map(|effort| Reasoning { effort: effort.clone() }),
                input: vec![
                    InputMessage {
                        role: Role::System,
                        content: MessageContent::Text(prompt.system_prompt.clone()),
                    },
                    InputMessage {
                        role: Role::User,
                        content: prompt.user_prompt.clone(),
                    },
                ],
                text: Some(TextOptions {
                    format: ResponseFormat::json_schema(schema_name, schema.clone()),
                }),
            },
            user_id: caller.user_id.clone(),
            workspace_id: caller.workspace_id.clone(),
        }
    }
}

/// Per-call options that are not part of the provider payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationOptions {
    pub expected_output_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Token and cost accounting reported by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_cost_usd: f64,
}

/// What a `ModelClient` returns: generated text plus optional usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub output: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ModelResponse {
    pub fn cost(&self) -> Option<f64> {
        self.usage.as_ref().map(|u| u.total_cost_usd)
    }
}

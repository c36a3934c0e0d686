//! HTTP client for OpenAI-Responses-style APIs.
//!
//! Sends the request payload to `{base_url}/responses` and turns the reply
//! into a `ModelResponse`: every `output_text` part of every `message` output
//! item, concatenated, plus token usage priced from the provider settings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use reelsmith_config::ProviderSettings;
use reelsmith_contracts::{
    error::{ReelsmithError, ReelsmithResult},
    model::{InvocationOptions, ModelPayload, ModelRequest, ModelResponse, Usage},
};
use reelsmith_core::traits::ModelClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    #[serde(flatten)]
    payload: &'a ModelPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    output: Vec<OutputItem>,
    usage: Option<ReplyUsage>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ReplyUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl ReplyBody {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// `ModelClient` for one Responses API endpoint.
#[derive(Clone)]
pub struct ResponsesClient {
    http: Client,
    api_key: String,
    base_url: String,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
}

impl ResponsesClient {
    pub fn new(api_key: impl Into<String>) -> ReelsmithResult<Self> {
        Ok(Self {
            http: build_http(DEFAULT_TIMEOUT_SECS)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            input_cost_per_million: 0.0,
            output_cost_per_million: 0.0,
        })
    }

    /// Build a client from a `[providers.<name>]` table.
    pub fn from_settings(settings: &ProviderSettings, api_key: impl Into<String>) -> ReelsmithResult<Self> {
        Ok(Self::new(api_key)?
            .with_base_url(&settings.base_url)
            .with_pricing(settings.input_cost_per_million, settings.output_cost_per_million)
            .with_timeout(settings.timeout_secs)?)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// USD per million input and output tokens.
    pub fn with_pricing(mut self, input_per_million: f64, output_per_million: f64) -> Self {
        self.input_cost_per_million = input_per_million;
        self.output_cost_per_million = output_per_million;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> ReelsmithResult<Self> {
        self.http = build_http(secs)?;
        Ok(self)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }

    fn price(&self, usage: &ReplyUsage) -> Usage {
        let cost = usage.input_tokens as f64 * self.input_cost_per_million / 1_000_000.0
            + usage.output_tokens as f64 * self.output_cost_per_million / 1_000_000.0;
        Usage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_cost_usd: cost,
        }
    }
}

fn build_http(timeout_secs: u64) -> ReelsmithResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ReelsmithError::ConfigError {
            reason: format!("failed to build HTTP client: {}", e),
        })
}

#[async_trait]
impl ModelClient for ResponsesClient {
    async fn invoke(
        &self,
        request: &ModelRequest,
        options: &InvocationOptions,
    ) -> ReelsmithResult<ModelResponse> {
        let url = self.endpoint();
        let body = RequestBody {
            model: &request.model,
            payload: &request.payload,
            metadata: options.metadata.as_ref(),
            user: request.user_id.as_deref(),
        };

        debug!(
            url = %url,
            model = %request.model,
            expected_output_tokens = options.expected_output_tokens,
            "sending responses request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReelsmithError::ModelInvocation {
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ReelsmithError::ModelInvocation {
            reason: format!("failed to read response body: {}", e),
        })?;

        debug!(status = status.as_u16(), bytes = text.len(), "responses reply received");

        if !status.is_success() {
            return Err(ReelsmithError::ProviderStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: ReplyBody = serde_json::from_str(&text).map_err(|e| ReelsmithError::ModelInvocation {
            reason: format!("unexpected response body: {}", e),
        })?;

        let output = reply.output_text();
        if output.is_empty() {
            return Err(ReelsmithError::ModelInvocation {
                reason: "response contained no output_text".to_string(),
            });
        }

        Ok(ModelResponse {
            output,
            usage: reply.usage.as_ref().map(|u| self.price(u)),
        })
    }
}

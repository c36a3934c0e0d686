//! # reelsmith-provider
//!
//! `ModelClient` implementations that reach hosted models over HTTP.
//!
//! - `ResponsesClient` speaks the OpenAI Responses API (`POST /responses`)
//!   with strict JSON-schema output, and prices token usage from settings.
//! - `ProviderRouter` dispatches each request to the client registered under
//!   `request.provider`.
//!
//! Neither retries: every failure goes straight back to the runner's retry
//! loop.

pub mod responses;
pub mod router;

#[cfg(test)]
mod mock_server;

pub use responses::ResponsesClient;
pub use router::ProviderRouter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use reelsmith_config::Settings;
    use reelsmith_contracts::{
        agent::{AgentConfig, CallerIdentity},
        error::{ReelsmithError, ReelsmithResult},
        model::{InvocationOptions, ModelRequest, ModelResponse},
        prompt::PromptPair,
    };
    use reelsmith_core::traits::ModelClient;

    use crate::mock_server::{text_reply, MockResponsesServer};
    use crate::{ProviderRouter, ResponsesClient};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_request(provider: &str) -> ModelRequest {
        let config = AgentConfig::new(provider, "gpt-4.1-mini").with_temperature(0.7);
        let prompt = PromptPair::new("You write captions.", "Script: Check this out!");
        let schema = json!({
            "type": "object",
            "properties": { "caption": { "type": "string" } },
            "required": ["caption"],
            "additionalProperties": false
        });
        let caller = CallerIdentity {
            user_id: Some("user-42".to_string()),
            workspace_id: None,
        };
        ModelRequest::structured(&config, &prompt, "tiktok_metadata", &schema, &caller)
    }

    fn options() -> InvocationOptions {
        InvocationOptions {
            expected_output_tokens: 256,
            metadata: Some(json!({ "agent": "platform-metadata" })),
        }
    }

    fn client_for(server: &MockResponsesServer) -> ResponsesClient {
        ResponsesClient::new("sk-test")
            .unwrap()
            .with_base_url(&server.base_url())
            .with_pricing(0.40, 1.60)
    }

    /// Records the provider of every request it sees.
    struct TaggedClient {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ModelClient for TaggedClient {
        async fn invoke(
            &self,
            request: &ModelRequest,
            _options: &InvocationOptions,
        ) -> ReelsmithResult<ModelResponse> {
            self.seen.lock().unwrap().push(request.provider.clone());
            Ok(ModelResponse {
                output: self.tag.to_string(),
                usage: None,
            })
        }
    }

    // ── ResponsesClient ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_collects_output_text_and_prices_usage() {
        let server = MockResponsesServer::start(vec![(
            200,
            text_reply(r#"{"caption":"wait for it... 👀"}"#, 1000, 500),
        )])
        .await;

        let response = client_for(&server).invoke(&make_request("openai"), &options()).await.unwrap();

        assert_eq!(response.output, r#"{"caption":"wait for it... 👀"}"#);
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.output_tokens, 500);
        // 1000 * 0.40 / 1e6 + 500 * 1.60 / 1e6
        assert!((usage.total_cost_usd - 0.0012).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_request_wire_shape() {
        let server = MockResponsesServer::start(vec![(200, text_reply("{}", 1, 1))]).await;
        client_for(&server).invoke(&make_request("openai"), &options()).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer sk-test"));

        let body = &requests[0].body;
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["input"][0]["role"], "system");
        assert_eq!(body["input"][1]["content"], "Script: Check this out!");
        assert_eq!(body["text"]["format"]["type"], "json_schema");
        assert_eq!(body["text"]["format"]["strict"], true);
        assert_eq!(body["metadata"]["agent"], "platform-metadata");
        assert_eq!(body["user"], "user-42");
        assert!(body.get("reasoning").is_none());
        assert!(body.get("provider").is_none());
    }

    #[tokio::test]
    async fn test_concatenates_multiple_text_parts() {
        let reply = json!({
            "output": [{
                "type": "message",
                "content": [
                    { "type": "output_text", "text": "{\"caption\":" },
                    { "type": "refusal", "refusal": "ignored" },
                    { "type": "output_text", "text": "\"hi\"}" }
                ]
            }]
        });
        let server = MockResponsesServer::start(vec![(200, reply)]).await;
        let response = client_for(&server).invoke(&make_request("openai"), &options()).await.unwrap();

        assert_eq!(response.output, r#"{"caption":"hi"}"#);
        assert!(response.usage.is_none());
        assert_eq!(response.cost(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_provider_status() {
        let server = MockResponsesServer::start(vec![(
            429,
            json!({ "error": { "message": "rate limited" } }),
        )])
        .await;

        let err = client_for(&server)
            .invoke(&make_request("openai"), &options())
            .await
            .unwrap_err();
        match err {
            ReelsmithError::ProviderStatus { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected ProviderStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_is_model_invocation_error() {
        let server = MockResponsesServer::start(vec![(200, json!("not an object"))]).await;
        let err = client_for(&server)
            .invoke(&make_request("openai"), &options())
            .await
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::ModelInvocation { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_empty_output_is_model_invocation_error() {
        let server = MockResponsesServer::start(vec![(200, json!({ "output": [] }))]).await;
        let err = client_for(&server)
            .invoke(&make_request("openai"), &options())
            .await
            .unwrap_err();
        match err {
            ReelsmithError::ModelInvocation { reason } => assert!(reason.contains("no output_text")),
            other => panic!("expected ModelInvocation, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ResponsesClient::new("k").unwrap().with_base_url("http://localhost:9/v1/");
        assert_eq!(client.endpoint(), "http://localhost:9/v1/responses");
    }

    // ── ProviderRouter ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_router_dispatches_on_provider() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = ProviderRouter::new()
            .with_provider("openai", Arc::new(TaggedClient { tag: "a", seen: seen.clone() }))
            .with_provider("azure", Arc::new(TaggedClient { tag: "b", seen: seen.clone() }));

        let a = router.invoke(&make_request("openai"), &options()).await.unwrap();
        let b = router.invoke(&make_request("azure"), &options()).await.unwrap();

        assert_eq!(a.output, "a");
        assert_eq!(b.output, "b");
        assert_eq!(*seen.lock().unwrap(), vec!["openai".to_string(), "azure".to_string()]);
        assert_eq!(router.providers(), vec!["azure", "openai"]);
    }

    #[tokio::test]
    async fn test_router_unknown_provider_is_config_error() {
        let router = ProviderRouter::new();
        let err = router.invoke(&make_request("gemini"), &options()).await.unwrap_err();
        match err {
            ReelsmithError::ConfigError { reason } => assert!(reason.contains("gemini")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_router_from_settings_requires_key() {
        let settings = Settings::from_toml_str(
            r#"
            [providers.openai]
            base_url = "https://api.openai.com/v1"
            api_key_env = "REELSMITH_TEST_KEY"
            "#,
        )
        .unwrap();

        let router = ProviderRouter::from_settings(&settings, |_| Some("sk".to_string())).unwrap();
        assert_eq!(router.providers(), vec!["openai"]);

        let err = ProviderRouter::from_settings(&settings, |_| None).err().unwrap();
        match err {
            ReelsmithError::ConfigError { reason } => assert!(reason.contains("$REELSMITH_TEST_KEY")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_router_from_settings_reaches_server() {
        let server = MockResponsesServer::start(vec![(200, text_reply("{}", 10, 10))]).await;
        let settings = Settings::from_toml_str(&format!(
            r#"
            [providers.openai]
            base_url = "{}"
            api_key_env = "OPENAI_API_KEY"
            output_cost_per_million = 2.0
            timeout_secs = 5
            "#,
            server.base_url()
        ))
        .unwrap();

        let router = ProviderRouter::from_settings(&settings, |_| Some("sk-env".to_string())).unwrap();
        let response = router.invoke(&make_request("openai"), &options()).await.unwrap();

        assert_eq!(response.output, "{}");
        assert!((response.cost().unwrap() - 0.00002).abs() < 1e-12);
        assert_eq!(server.requests()[0].authorization.as_deref(), Some("Bearer sk-env"));
    }
}

//! Mock model clients shared by the agent tests.

use async_trait::async_trait;
use serde_json::Value;

use reelsmith_contracts::{
    error::ReelsmithResult,
    model::{InvocationOptions, ModelRequest, ModelResponse},
};
use reelsmith_core::{testing, traits::ModelClient};

pub use reelsmith_core::testing::ScriptedClient;

/// A priced reply; agent tests always carry usage.
pub fn reply(output: &str, cost: f64) -> ReelsmithResult<ModelResponse> {
    testing::reply(output, Some(cost))
}

/// Answers by schema name, so concurrent callers get deterministic replies.
pub struct BySchemaClient {
    pub answer: Box<dyn Fn(&str) -> ReelsmithResult<ModelResponse> + Send + Sync>,
}

#[async_trait]
impl ModelClient for BySchemaClient {
    async fn invoke(
        &self,
        request: &ModelRequest,
        _options: &InvocationOptions,
    ) -> ReelsmithResult<ModelResponse> {
        let name = request
            .payload
            .text
            .as_ref()
            .map(|t| t.format.name.clone())
            .unwrap_or_default();
        (self.answer)(&name)
    }
}

/// The JSON Schema document attached to a request.
pub fn request_schema(request: &ModelRequest) -> Value {
    request
        .payload
        .text
        .as_ref()
        .map(|t| t.format.schema.clone())
        .unwrap()
}

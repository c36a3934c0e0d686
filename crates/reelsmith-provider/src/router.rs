//! Provider routing.
//!
//! `ProviderRouter` is itself a `ModelClient`: it looks up
//! `request.provider` in its table and forwards the call. Agents therefore
//! pick their provider through `AgentConfig` alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use reelsmith_config::Settings;
use reelsmith_contracts::{
    error::{ReelsmithError, ReelsmithResult},
    model::{InvocationOptions, ModelRequest, ModelResponse},
};
use reelsmith_core::traits::ModelClient;

use crate::responses::ResponsesClient;

#[derive(Clone, Default)]
pub struct ProviderRouter {
    clients: BTreeMap<String, Arc<dyn ModelClient>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: impl Into<String>, client: Arc<dyn ModelClient>) -> Self {
        self.clients.insert(name.into(), client);
        self
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    /// Build one `ResponsesClient` per `[providers.<name>]` table.
    ///
    /// `lookup_key` resolves an environment variable name to its value; the
    /// CLI passes `std::env::var`. A provider whose key variable is unset is
    /// a `ConfigError`.
    pub fn from_settings<F>(settings: &Settings, lookup_key: F) -> ReelsmithResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut router = Self::new();
        for (name, provider) in &settings.providers {
            let api_key = lookup_key(&provider.api_key_env).ok_or_else(|| ReelsmithError::ConfigError {
                reason: format!(
                    "provider '{}' requires an API key in ${}",
                    name, provider.api_key_env
                ),
            })?;
            let client = ResponsesClient::from_settings(provider, api_key)?;
            info!(provider = %name, endpoint = %client.endpoint(), "provider registered");
            router = router.with_provider(name.clone(), Arc::new(client));
        }
        Ok(router)
    }
}

#[async_trait]
impl ModelClient for ProviderRouter {
    async fn invoke(
        &self,
        request: &ModelRequest,
        options: &InvocationOptions,
    ) -> ReelsmithResult<ModelResponse> {
        let client = self
            .clients
            .get(&request.provider)
            .ok_or_else(|| ReelsmithError::ConfigError {
                reason: format!("provider '{}' is not configured", request.provider),
            })?;
        client.invoke(request, options).await
    }
}

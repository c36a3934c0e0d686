//! Scripted model client for tests.
//!
//! Compiled for this crate's own tests and, through the `test-util` feature,
//! for downstream crates' tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use reelsmith_contracts::{
    error::{ReelsmithError, ReelsmithResult},
    model::{InvocationOptions, ModelRequest, ModelResponse, Usage},
};

use crate::traits::ModelClient;

/// A successful response carrying `output`, priced at `cost` when given.
pub fn reply(output: &str, cost: Option<f64>) -> ReelsmithResult<ModelResponse> {
    Ok(ModelResponse {
        output: output.to_string(),
        usage: cost.map(|total_cost_usd| Usage {
            input_tokens: 100,
            output_tokens: 50,
            total_cost_usd,
        }),
    })
}

/// Plays back a fixed script of results and records every request.
///
/// Once the script runs dry every call fails with a 503.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Mutex<VecDeque<ReelsmithResult<ModelResponse>>>>,
    pub requests: Arc<Mutex<Vec<ModelRequest>>>,
    pub options: Arc<Mutex<Vec<InvocationOptions>>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<ReelsmithResult<ModelResponse>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The most recent request, if any call was made.
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn invoke(
        &self,
        request: &ModelRequest,
        options: &InvocationOptions,
    ) -> ReelsmithResult<ModelResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options.clone());
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ReelsmithError::ProviderStatus {
                    status: 503,
                    body: "script exhausted".to_string(),
                })
            })
    }
}

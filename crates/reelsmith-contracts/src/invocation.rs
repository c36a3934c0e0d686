//! Per-invocation accounting records.
//!
//! The runner produces exactly one `InvocationRecord` per agent call, success
//! or failure, and hands it to the configured `UsageRecorder`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, InvocationId};

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationOutcome {
    Succeeded,
    Failed {
        /// Display form of the last error.
        reason: String,
    },
}

/// An immutable record of one agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub invocation_id: InvocationId,
    pub agent_id: AgentId,
    pub provider: String,
    pub model: String,
    /// Model calls made, including the successful one.
    pub attempts: u32,
    pub outcome: InvocationOutcome,
    /// Total billed across every attempt in USD, failed attempts included.
    /// `None` when no response reported a cost.
    pub cost_usd: Option<f64>,
    /// Wall-clock time from the first attempt to the outcome, backoff included.
    pub latency_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl InvocationRecord {
    pub fn succeeded(&self) -> bool {
        self.outcome == InvocationOutcome::Succeeded
    }
}

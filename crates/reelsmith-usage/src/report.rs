//! Usage summary types.
//!
//! `AgentUsage` aggregates every invocation of one agent. `UsageReport` is
//! the snapshot produced by `InMemoryUsageLedger::export_report()`, ready to
//! be serialized for a billing job or printed by the CLI.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reelsmith_contracts::invocation::InvocationRecord;

/// Running totals for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentUsage {
    /// Invocations recorded, successful or not.
    pub calls: u64,

    /// Invocations that ended in an error.
    pub failures: u64,

    /// Model calls across all invocations, retries included.
    pub attempts: u64,

    /// Summed cost in USD of every invocation that reported one.
    pub total_cost_usd: f64,

    /// Summed wall-clock latency, backoff included.
    pub total_latency_ms: u64,
}

impl AgentUsage {
    /// Fold one record into the totals.
    pub(crate) fn add(&mut self, record: &InvocationRecord) {
        self.calls += 1;
        if !record.succeeded() {
            self.failures += 1;
        }
        self.attempts += u64::from(record.attempts);
        self.total_cost_usd += record.cost_usd.unwrap_or(0.0);
        self.total_latency_ms += record.latency_ms;
    }

    /// Retries spent beyond the first attempt of each call.
    pub fn retries(&self) -> u64 {
        self.attempts.saturating_sub(self.calls)
    }
}

/// A point-in-time export of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Per-agent totals keyed by agent id, in id order.
    pub agents: BTreeMap<String, AgentUsage>,

    /// Sum of `total_cost_usd` across all agents.
    pub total_cost_usd: f64,

    /// Every record, in the order it was written.
    pub records: Vec<InvocationRecord>,

    pub exported_at: DateTime<Utc>,
}

impl UsageReport {
    /// One line per agent, e.g.
    /// `platform-metadata: 4 calls (1 failed), 6 attempts, $0.001200`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.agents
            .iter()
            .map(|(id, usage)| {
                format!(
                    "{}: {} call{} ({} failed), {} attempts, ${:.6}",
                    id,
                    usage.calls,
                    if usage.calls == 1 { "" } else { "s" },
                    usage.failures,
                    usage.attempts,
                    usage.total_cost_usd
                )
            })
            .collect()
    }
}

//! In-memory implementation of `UsageRecorder`.
//!
//! `InMemoryUsageLedger` keeps every `InvocationRecord` in a `Vec` behind a
//! `Mutex`, alongside per-agent running totals. Clones share the same state,
//! so one clone can be handed to an `AgentRunner` while another is kept for
//! reporting.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use reelsmith_contracts::{
    error::{ReelsmithError, ReelsmithResult},
    invocation::InvocationRecord,
};
use reelsmith_core::traits::UsageRecorder;

use crate::report::{AgentUsage, UsageReport};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct LedgerState {
    /// All records written so far, in append order.
    records: Vec<InvocationRecord>,

    /// Running totals keyed by agent id.
    by_agent: BTreeMap<String, AgentUsage>,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An append-only, in-memory usage ledger.
#[derive(Clone, Default)]
pub struct InMemoryUsageLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ReelsmithResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|e| ReelsmithError::UsageRecordFailed {
            reason: format!("usage ledger lock poisoned: {}", e),
        })
    }

    /// Every record written so far, oldest first.
    pub fn records(&self) -> ReelsmithResult<Vec<InvocationRecord>> {
        Ok(self.lock()?.records.clone())
    }

    /// Totals for one agent, or `None` if it has never been recorded.
    pub fn agent_usage(&self, agent_id: &str) -> ReelsmithResult<Option<AgentUsage>> {
        Ok(self.lock()?.by_agent.get(agent_id).cloned())
    }

    /// Summed cost in USD across every agent.
    pub fn total_cost_usd(&self) -> ReelsmithResult<f64> {
        Ok(self.lock()?.by_agent.values().map(|u| u.total_cost_usd).sum())
    }

    /// Snapshot the ledger into a serializable report.
    pub fn export_report(&self) -> ReelsmithResult<UsageReport> {
        let state = self.lock()?;
        Ok(UsageReport {
            agents: state.by_agent.clone(),
            total_cost_usd: state.by_agent.values().map(|u| u.total_cost_usd).sum(),
            records: state.records.clone(),
            exported_at: Utc::now(),
        })
    }
}

// ── UsageRecorder impl ────────────────────────────────────────────────────────

impl UsageRecorder for InMemoryUsageLedger {
    /// Append one record and fold it into its agent's totals.
    ///
    /// Returns `Err(UsageRecordFailed)` only if the internal mutex is
    /// poisoned.
    fn record(&self, record: &InvocationRecord) -> ReelsmithResult<()> {
        let mut state = self.lock()?;

        state
            .by_agent
            .entry(record.agent_id.as_str().to_string())
            .or_default()
            .add(record);
        state.records.push(record.clone());

        debug!(
            agent = %record.agent_id,
            invocation_id = %record.invocation_id,
            attempts = record.attempts,
            succeeded = record.succeeded(),
            record_count = state.records.len(),
            "usage recorded"
        );

        Ok(())
    }
}

//! # reelsmith-usage
//!
//! Usage and cost accounting for REELSMITH agent invocations.
//!
//! ## Overview
//!
//! The runner hands one `InvocationRecord` to its `UsageRecorder` per agent
//! call. `InMemoryUsageLedger` is the reference recorder: it keeps the raw
//! records and per-agent totals (calls, failures, attempts, cost, latency)
//! and exports them as a `UsageReport`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reelsmith_usage::InMemoryUsageLedger;
//!
//! let ledger = InMemoryUsageLedger::new();
//! let runner = AgentRunner::new(client).with_recorder(Arc::new(ledger.clone()));
//! runner.run(&agent, &input).await?;
//!
//! for line in ledger.export_report()?.summary_lines() {
//!     println!("{line}");
//! }
//! ```

pub mod ledger;
pub mod report;

pub use ledger::InMemoryUsageLedger;
pub use report::{AgentUsage, UsageReport};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use reelsmith_contracts::{
        agent::{AgentId, InvocationId},
        invocation::{InvocationOutcome, InvocationRecord},
    };
    use reelsmith_core::traits::UsageRecorder;

    use super::InMemoryUsageLedger;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(agent: &str, attempts: u32, cost: Option<f64>, ok: bool) -> InvocationRecord {
        InvocationRecord {
            invocation_id: InvocationId::new(),
            agent_id: AgentId::new(agent),
            provider: "openai".to_string(),
            model: "gpt-4.1-mini".to_string(),
            attempts,
            outcome: if ok {
                InvocationOutcome::Succeeded
            } else {
                InvocationOutcome::Failed {
                    reason: "provider returned status 503: overloaded".to_string(),
                }
            },
            cost_usd: cost,
            latency_ms: 100 * u64::from(attempts),
            started_at: Utc::now(),
        }
    }

    // ── Recording ─────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_ledger() {
        let ledger = InMemoryUsageLedger::new();
        assert!(ledger.records().unwrap().is_empty());
        assert_eq!(ledger.total_cost_usd().unwrap(), 0.0);
        assert!(ledger.agent_usage("ambient-scene").unwrap().is_none());
    }

    #[test]
    fn test_records_kept_in_write_order() {
        let ledger = InMemoryUsageLedger::new();
        let first = make_record("ambient-scene", 1, Some(0.001), true);
        let second = make_record("platform-metadata", 2, Some(0.002), true);
        ledger.record(&first).unwrap();
        ledger.record(&second).unwrap();

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].invocation_id, first.invocation_id);
        assert_eq!(records[1].invocation_id, second.invocation_id);
    }

    #[test]
    fn test_per_agent_totals() {
        let ledger = InMemoryUsageLedger::new();
        ledger.record(&make_record("platform-metadata", 1, Some(0.001), true)).unwrap();
        ledger.record(&make_record("platform-metadata", 3, None, false)).unwrap();
        ledger.record(&make_record("ambient-scene", 2, Some(0.004), true)).unwrap();

        let metadata = ledger.agent_usage("platform-metadata").unwrap().unwrap();
        assert_eq!(metadata.calls, 2);
        assert_eq!(metadata.failures, 1);
        assert_eq!(metadata.attempts, 4);
        assert_eq!(metadata.retries(), 2);
        assert_eq!(metadata.total_latency_ms, 400);
        assert!((metadata.total_cost_usd - 0.001).abs() < 1e-12);

        assert!((ledger.total_cost_usd().unwrap() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_clones_share_state() {
        let ledger = InMemoryUsageLedger::new();
        let handle = ledger.clone();
        handle.record(&make_record("ambient-scene", 1, None, true)).unwrap();
        assert_eq!(ledger.records().unwrap().len(), 1);
    }

    // ── Export ────────────────────────────────────────────────────────────────

    #[test]
    fn test_export_report_serializes() {
        let ledger = InMemoryUsageLedger::new();
        ledger.record(&make_record("ambient-scene", 2, Some(0.0025), true)).unwrap();

        let report = ledger.export_report().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["agents"]["ambient-scene"]["attempts"], 2);
        assert_eq!(json["records"][0]["outcome"]["status"], "succeeded");
    }

    #[test]
    fn test_summary_lines_sorted_by_agent() {
        let ledger = InMemoryUsageLedger::new();
        ledger.record(&make_record("platform-metadata", 1, Some(0.0012), true)).unwrap();
        ledger.record(&make_record("ambient-scene", 3, None, false)).unwrap();

        let lines = ledger.export_report().unwrap().summary_lines();
        assert_eq!(
            lines,
            vec![
                "ambient-scene: 1 call (1 failed), 3 attempts, $0.000000".to_string(),
                "platform-metadata: 1 call (0 failed), 1 attempts, $0.001200".to_string(),
            ]
        );
    }
}

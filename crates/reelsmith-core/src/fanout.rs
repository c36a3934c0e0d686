//! Concurrent, failure-isolated batch invocation.
//!
//! A batch issues one independent call per item and awaits them all. A failed
//! item never fails the batch: it is logged and replaced by a placeholder built
//! from the item, so the caller always gets one result per input, in input
//! order.

use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use reelsmith_contracts::error::ReelsmithResult;

/// Run `call` for every item concurrently.
///
/// `label` names the batch in log events. `placeholder` builds the stand-in
/// result for an item whose call failed.
pub async fn fan_out<'a, I, O, F, Fut, P>(
    label: &str,
    items: &'a [I],
    call: F,
    placeholder: P,
) -> Vec<O>
where
    F: Fn(&'a I) -> Fut,
    Fut: Future<Output = ReelsmithResult<O>>,
    P: Fn(&I) -> O,
{
    debug!(batch = %label, items = items.len(), "fan-out starting");

    let results = join_all(items.iter().map(&call)).await;

    let mut failed = 0usize;
    let outputs: Vec<O> = results
        .into_iter()
        .zip(items)
        .enumerate()
        .map(|(index, (result, item))| match result {
            Ok(output) => output,
            Err(error) => {
                failed += 1;
                warn!(
                    batch = %label,
                    index,
                    error = %error,
                    "fan-out item failed, substituting placeholder"
                );
                placeholder(item)
            }
        })
        .collect();

    debug!(
        batch = %label,
        items = items.len(),
        failed,
        "fan-out complete"
    );
    outputs
}

// ── Tests ────────────────────────────────────────────────────────────────────

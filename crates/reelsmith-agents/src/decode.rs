use serde::de::DeserializeOwned;
use serde_json::Value;

use reelsmith_contracts::error::{ReelsmithError, ReelsmithResult};

/// Typed view of a parsed model answer. A mismatch is a retryable
/// `MalformedOutput`.
pub(crate) fn decode<T: DeserializeOwned>(schema_name: &str, parsed: Value) -> ReelsmithResult<T> {
    serde_json::from_value(parsed).map_err(|e| ReelsmithError::MalformedOutput {
        reason: format!("output does not match {schema_name}: {e}"),
    })
}

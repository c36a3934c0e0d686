//! Error types for the REELSMITH agent layer.
//!
//! All fallible operations return `ReelsmithResult<T>`. Variants carry enough
//! context for a route handler to surface the message to a user unchanged.

use thiserror::Error;

/// The unified error type for REELSMITH.
#[derive(Debug, Error)]
pub enum ReelsmithError {
    /// The model client could not complete the call (transport failure,
    /// unreadable response body, provider-side rejection without a status).
    #[error("model invocation failed: {reason}")]
    ModelInvocation { reason: String },

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    /// The model returned text that is not the JSON document we asked for.
    #[error("malformed model output: {reason}")]
    MalformedOutput { reason: String },

    /// The parsed output failed client-side verification against its schema.
    #[error("output verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The usage recorder could not store an invocation record.
    #[error("usage record failed: {reason}")]
    UsageRecordFailed { reason: String },

    /// The retry loop ended without a single attempt having run.
    ///
    /// Only reachable with a zero attempt budget; any attempt that runs and
    /// fails surfaces its own error instead.
    #[error("{agent} failed to {task}")]
    RetriesExhausted { agent: String, task: String },
}

/// Convenience alias used throughout the REELSMITH crates.
pub type ReelsmithResult<T> = Result<T, ReelsmithError>;

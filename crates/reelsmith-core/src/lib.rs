//! # reelsmith-core
//!
//! The retry-governed, schema-validated invocation runtime for REELSMITH
//! agents.
//!
//! This crate provides:
//! - The four core traits (`ModelClient`, `StructuredAgent`, `Verifier`, `UsageRecorder`)
//! - `invoke_with_retry`, the single retry loop every agent call goes through
//! - The `AgentRunner` that wires them together per call
//! - `fan_out`, for concurrent failure-isolated batches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reelsmith_core::{AgentRunner, traits::StructuredAgent};
//!
//! let runner = AgentRunner::new(client).with_verifier(verifier);
//! let plan = runner.run(&ambient_agent, &brief).await?;
//! ```

pub mod fanout;
pub mod retry;
pub mod runner;
pub mod traits;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use fanout::fan_out;
pub use retry::{invoke_with_retry, RetryPolicy};
pub use runner::AgentRunner;

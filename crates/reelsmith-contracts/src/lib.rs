//! # reelsmith-contracts
//!
//! Shared types, schemas, and contracts for the REELSMITH agent layer.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod agent;
pub mod error;
pub mod invocation;
pub mod model;
pub mod prompt;
pub mod verify;

//! # reelsmith-verify
//!
//! Client-side output verification for REELSMITH agents.
//!
//! This crate provides [`engine::SchemaVerifier`], which implements the
//! [`reelsmith_core::traits::Verifier`] trait. It validates parsed model
//! output in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic**: rules (`RequiredField`, `AllowedValues`,
//!    `ForbiddenPattern`, `Custom`) evaluated against the output.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use reelsmith_verify::engine::SchemaVerifier;
//!
//! let mut verifier = SchemaVerifier::new();
//! verifier.register_rule("tiktok-hashtag-limit", Box::new(|payload| {
//!     let caption = payload["caption"].as_str().unwrap_or("");
//!     (caption.matches('#').count() > 5).then(|| "too many hashtags".to_string())
//! }));
//! ```

pub mod engine;

pub use engine::{CustomVerifierFn, SchemaVerifier};

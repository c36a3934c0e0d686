//! # reelsmith-config
//!
//! TOML settings for REELSMITH agents and providers.
//!
//! ## Overview
//!
//! Agents ship with built-in `AgentConfig` values. A settings file can change
//! any of them without a rebuild: `[defaults]` applies to every agent,
//! `[agents.<id>]` to one, and `[providers.<name>]` tells the HTTP client
//! where to connect and how to price tokens.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use reelsmith_config::Settings;
//!
//! let settings = Settings::from_file(Path::new("reelsmith.toml"))?;
//! let config = settings.agent_config(&AgentId::new("ambient-scene"), ambient_scene::default_config())?;
//! ```

pub mod loader;
pub mod settings;

pub use settings::{AgentOverride, ProviderSettings, Settings};

// ── Tests ─────────────────────────────────────────────────────────────────────

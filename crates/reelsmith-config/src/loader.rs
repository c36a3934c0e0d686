//! Loading, validation, and resolution of settings.
//!
//! Resolution order for one agent, lowest to highest precedence:
//!
//! 1. the agent module's built-in `AgentConfig`
//! 2. `[defaults]`
//! 3. `[agents.<id>]`
//!
//! The merged config is validated before it is handed back, so an agent is
//! never constructed with a zero retry budget or an unknown provider.

use std::path::Path;

use tracing::debug;

use reelsmith_contracts::{
    agent::{AgentConfig, AgentId},
    error::{ReelsmithError, ReelsmithResult},
};

use crate::settings::{AgentOverride, ProviderSettings, Settings};

/// Upper bound on the backoff unit. Ten minutes per step is already longer
/// than any caller waits for a reply.
pub const MAX_BACKOFF_BASE_MS: u64 = 600_000;

impl Settings {
    /// Parse `s` as TOML and validate it.
    ///
    /// Returns `ReelsmithError::ConfigError` if the TOML is malformed, does
    /// not match the `Settings` schema, or carries out-of-range values.
    pub fn from_toml_str(s: &str) -> ReelsmithResult<Self> {
        let settings: Settings = toml::from_str(s).map_err(|e| ReelsmithError::ConfigError {
            reason: format!("failed to parse settings TOML: {}", e),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read the file at `path` and parse it as TOML settings.
    pub fn from_file(path: &Path) -> ReelsmithResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReelsmithError::ConfigError {
            reason: format!("failed to read settings file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Look up a provider by name.
    pub fn provider(&self, name: &str) -> ReelsmithResult<&ProviderSettings> {
        self.providers.get(name).ok_or_else(|| ReelsmithError::ConfigError {
            reason: format!("provider '{}' is not declared in [providers]", name),
        })
    }

    /// Merge `builtin` with `[defaults]` and the agent's own table.
    ///
    /// # Errors
    ///
    /// `ConfigError` when the merged config has a zero retry budget, a
    /// temperature outside `0.0..=2.0`, or names a provider that is not
    /// declared while at least one provider is.
    pub fn agent_config(&self, agent: &AgentId, builtin: AgentConfig) -> ReelsmithResult<AgentConfig> {
        let mut config = builtin;
        apply(&mut config, &self.defaults);
        if let Some(ov) = self.agents.get(agent.as_str()) {
            apply(&mut config, ov);
        }

        check_retries(agent.as_str(), config.max_retries)?;
        if let Some(t) = config.temperature {
            check_temperature(agent.as_str(), t)?;
        }
        if !self.providers.is_empty() && !self.providers.contains_key(&config.provider) {
            return Err(ReelsmithError::ConfigError {
                reason: format!(
                    "agent '{}' uses provider '{}' which is not declared in [providers]",
                    agent, config.provider
                ),
            });
        }

        debug!(
            agent = %agent,
            provider = %config.provider,
            model = %config.model,
            max_retries = config.max_retries,
            "agent config resolved"
        );
        Ok(config)
    }

    /// Range checks on every override table.
    fn validate(&self) -> ReelsmithResult<()> {
        validate_override("defaults", &self.defaults)?;
        for (id, ov) in &self.agents {
            validate_override(&format!("agents.{id}"), ov)?;
        }
        for (name, provider) in &self.providers {
            if provider.base_url.trim().is_empty() {
                return Err(ReelsmithError::ConfigError {
                    reason: format!("providers.{name}: base_url must not be empty"),
                });
            }
            if provider.input_cost_per_million < 0.0 || provider.output_cost_per_million < 0.0 {
                return Err(ReelsmithError::ConfigError {
                    reason: format!("providers.{name}: token prices must not be negative"),
                });
            }
            if provider.timeout_secs == 0 {
                return Err(ReelsmithError::ConfigError {
                    reason: format!("providers.{name}: timeout_secs must be at least 1"),
                });
            }
        }
        Ok(())
    }
}

fn apply(config: &mut AgentConfig, ov: &AgentOverride) {
    if let Some(provider) = &ov.provider {
        config.provider = provider.clone();
    }
    if let Some(model) = &ov.model {
        config.model = model.clone();
    }
    if let Some(t) = ov.temperature {
        config.temperature = Some(t);
    }
    if let Some(n) = ov.max_retries {
        config.max_retries = n;
    }
    if let Some(effort) = &ov.reasoning_effort {
        config.reasoning_effort = Some(effort.clone());
    }
    if let Some(tokens) = ov.expected_output_tokens {
        config.expected_output_tokens = tokens;
    }
    if let Some(ms) = ov.backoff_base_ms {
        config.backoff_base_ms = ms;
    }
}

fn validate_override(scope: &str, ov: &AgentOverride) -> ReelsmithResult<()> {
    if let Some(n) = ov.max_retries {
        check_retries(scope, n)?;
    }
    if let Some(t) = ov.temperature {
        check_temperature(scope, t)?;
    }
    if let Some(ms) = ov.backoff_base_ms {
        if ms > MAX_BACKOFF_BASE_MS {
            return Err(ReelsmithError::ConfigError {
                reason: format!("{scope}: backoff_base_ms {ms} exceeds {MAX_BACKOFF_BASE_MS}"),
            });
        }
    }
    Ok(())
}

fn check_retries(scope: &str, n: u32) -> ReelsmithResult<()> {
    if n == 0 {
        return Err(ReelsmithError::ConfigError {
            reason: format!("{scope}: max_retries must be at least 1"),
        });
    }
    Ok(())
}

fn check_temperature(scope: &str, t: f32) -> ReelsmithResult<()> {
    if !(0.0..=2.0).contains(&t) {
        return Err(ReelsmithError::ConfigError {
            reason: format!("{scope}: temperature {t} is outside 0.0..=2.0"),
        });
    }
    Ok(())
}

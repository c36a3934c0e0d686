//! Schema-based output verifier.
//!
//! `SchemaVerifier` re-checks a parsed model answer against the same
//! `OutputSchema` the provider was asked to honour. Providers enforce strict
//! schemas on most models but not all, and some constraints (pattern,
//! numeric bounds) are only advisory on their side, so the runner repeats
//! the check before handing output to an agent.
//!
//! A report collects every failure rather than stopping at the first: the
//! JSON Schema violations, then each `VerificationRule` in declaration
//! order. Rules that need code rather than a declaration (hashtag budgets,
//! scene numbering) are `Custom` rules looked up by name in the verifier's
//! registry.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use reelsmith_contracts::{
    error::{ReelsmithError, ReelsmithResult},
    verify::{OutputSchema, VerificationFailure, VerificationReport, VerificationRule, VerificationRuleType},
};
use reelsmith_core::traits::Verifier;

/// Named check over a whole parsed output: `Some(reason)` on failure.
pub type CustomVerifierFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

const STRUCTURE_RULE_ID: &str = "json-schema";

#[derive(Default)]
pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomVerifierFn>,
}

impl SchemaVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `f` available to `Custom { function_name }` rules naming `name`.
    /// A second registration under the same name wins.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomVerifierFn) {
        let name = name.into();
        debug!(rule = %name, "custom verification rule registered");
        self.custom_rules.insert(name, f);
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.custom_rules.contains_key(name)
    }

    /// JSON Schema violations of `output`, one failure each.
    fn structural_failures(
        &self,
        output: &Value,
        schema: &OutputSchema,
    ) -> ReelsmithResult<Vec<VerificationFailure>> {
        // Null means the agent declared no structure.
        if schema.json_schema.is_null() {
            return Ok(Vec::new());
        }

        let validator = jsonschema::validator_for(&schema.json_schema).map_err(|e| {
            ReelsmithError::SchemaValidation {
                reason: format!("schema '{}' does not compile: {e}", schema.name),
            }
        })?;

        Ok(validator
            .iter_errors(output)
            .map(|error| VerificationFailure {
                rule_id: STRUCTURE_RULE_ID.to_string(),
                message: format!("at '{}': {}", error.instance_path, error),
            })
            .collect())
    }

    /// Evaluate one semantic rule. `None` means it passed.
    fn rule_failure(&self, rule: &VerificationRule, output: &Value) -> Option<String> {
        match &rule.rule_type {
            VerificationRuleType::RequiredField { field_path } => lookup(output, field_path)
                .is_none()
                .then(|| format!("'{field_path}' is absent or null")),

            VerificationRuleType::AllowedValues { field_path, allowed } => match lookup(output, field_path) {
                None => Some(format!("'{field_path}' is absent, expected one of {}", list(allowed))),
                Some(value) if allowed.contains(value) => None,
                Some(value) => Some(format!("'{field_path}' is {value}, expected one of {}", list(allowed))),
            },

            // Only strings are searched; anything else passes.
            VerificationRuleType::ForbiddenPattern { field_path, pattern } => lookup(output, field_path)
                .and_then(Value::as_str)
                .filter(|text| text.to_lowercase().contains(&pattern.to_lowercase()))
                .map(|_| format!("'{field_path}' contains \"{pattern}\"")),

            VerificationRuleType::Custom { function_name } => match self.custom_rules.get(function_name) {
                Some(check) => check(output),
                None => Some(format!("custom rule '{function_name}' is not registered")),
            },
        }
    }
}

/// Walk a dotted path such as `scenes.0.order`. Numeric segments index
/// arrays. JSON `null` counts as absent.
fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(value, |node, segment| match node {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => node.get(segment),
        })
        .filter(|found| !found.is_null())
}

fn list(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

impl Verifier for SchemaVerifier {
    /// # Errors
    ///
    /// `SchemaValidation` when the schema document itself does not compile.
    /// A failing output is not an error; it is a report with `passed = false`.
    fn verify(&self, output: &Value, schema: &OutputSchema) -> ReelsmithResult<VerificationReport> {
        let mut failures = self.structural_failures(output, schema)?;

        failures.extend(schema.rules.iter().filter_map(|rule| {
            self.rule_failure(rule, output).map(|message| VerificationFailure {
                rule_id: rule.rule_id.clone(),
                message,
            })
        }));

        let passed = failures.is_empty();
        if passed {
            debug!(schema = %schema.name, rules = schema.rules.len(), "output verified");
        } else {
            for failure in &failures {
                warn!(schema = %schema.name, rule = %failure.rule_id, reason = %failure.message, "verification failure");
            }
        }

        Ok(VerificationReport { passed, failures })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

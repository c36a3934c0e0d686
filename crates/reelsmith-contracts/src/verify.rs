//! Output schema and verification report types.
//!
//! An `OutputSchema` is sent to the provider for constrained decoding and,
//! when a verifier is attached to the runner, checked again on our side
//! before the output is repackaged for the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declarative contract a model's JSON output must satisfy.
///
/// Built once per agent (or per agent and platform) and shared across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema name sent to the provider (e.g. "ambient_scene_plan").
    pub name: String,
    /// A JSON Schema document used for structural validation.
    pub json_schema: Value,
    /// Additional domain rules evaluated after structural validation.
    pub rules: Vec<VerificationRule>,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, json_schema: Value) -> Self {
        Self {
            name: name.into(),
            json_schema,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: VerificationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A single verification rule applied to a parsed output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    /// Unique identifier for this rule, referenced in failure reports.
    pub rule_id: String,
    /// Human-readable description for logs.
    pub description: String,
    /// The verification logic to apply.
    pub rule_type: VerificationRuleType,
}

/// The kinds of verification checks supported out of the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    /// The field at `field_path` must be present and non-null.
    RequiredField {
        /// Dotted path, e.g. "scenes.0.description".
        field_path: String,
    },

    /// The field at `field_path` must equal one of `allowed`.
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },

    /// The string at `field_path` must not contain `pattern` as a substring,
    /// compared case-insensitively.
    ForbiddenPattern {
        field_path: String,
        pattern: String,
    },

    /// Delegate to a named function registered with the verifier.
    Custom {
        function_name: String,
    },
}

/// The result of running an `OutputSchema` against an output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if all rules passed.
    pub passed: bool,
    /// All failures collected during this run. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// Failures joined into one line: `[rule] message; [rule] message`.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single rule failure within a `VerificationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// The `rule_id` of the rule that failed.
    pub rule_id: String,
    /// Why the rule failed.
    pub message: String,
}

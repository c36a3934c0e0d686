//! Ambient scene planner.
//!
//! Plans a looping background visual for a mood: a text-to-video prompt, the
//! energy the motion should carry, a particle effect, a camera move, and a
//! small color palette. The renderer consumes the plan as is, so the schema
//! pins every value to something it can draw.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use reelsmith_contracts::{
    agent::{AgentConfig, AgentId},
    error::ReelsmithResult,
    prompt::PromptPair,
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use reelsmith_core::traits::StructuredAgent;

use crate::decode::decode;

pub const AGENT_ID: &str = "ambient-scene";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientBrief {
    pub mood: String,
    pub scene_description: String,
    /// 0 (still) ..= 100 (restless).
    pub intensity: u8,
    pub duration_seconds: u32,
    #[serde(default)]
    pub palette_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleType {
    None,
    Dust,
    Embers,
    Snow,
    Rain,
    Fireflies,
    Bokeh,
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMotion {
    Static,
    SlowPan,
    SlowZoomIn,
    SlowZoomOut,
    Orbit,
    Drift,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmbientScenePlan {
    pub visual_prompt: String,
    /// 0.0 ..= 1.0
    pub target_energy: f64,
    pub particle_type: ParticleType,
    pub camera_motion: CameraMotion,
    /// 3 to 5 `#RRGGBB` colors.
    pub color_palette: Vec<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

fn plan_schema() -> OutputSchema {
    let json_schema = json!({
        "type": "object",
        "properties": {
            "visual_prompt": { "type": "string", "minLength": 1, "maxLength": 600 },
            "target_energy": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "particle_type": {
                "type": "string",
                "enum": ["none", "dust", "embers", "snow", "rain", "fireflies", "bokeh", "smoke"]
            },
            "camera_motion": {
                "type": "string",
                "enum": ["static", "slow_pan", "slow_zoom_in", "slow_zoom_out", "orbit", "drift"]
            },
            "color_palette": {
                "type": "array",
                "minItems": 3,
                "maxItems": 5,
                "items": { "type": "string", "pattern": "^#[0-9A-Fa-f]{6}$" }
            }
        },
        "required": ["visual_prompt", "target_energy", "particle_type", "camera_motion", "color_palette"],
        "additionalProperties": false
    });

    OutputSchema::new("ambient_scene_plan", json_schema).with_rule(VerificationRule {
        rule_id: "no-text-in-scene".to_string(),
        description: "Ambient loops carry no rendered text".to_string(),
        rule_type: VerificationRuleType::ForbiddenPattern {
            field_path: "visual_prompt".to_string(),
            pattern: "text overlay".to_string(),
        },
    })
}

pub fn default_config() -> AgentConfig {
    AgentConfig::new("openai", "gpt-4.1-mini")
        .with_temperature(0.9)
        .with_expected_output_tokens(800)
}

pub struct AmbientSceneAgent {
    id: AgentId,
    config: AgentConfig,
    schema: OutputSchema,
}

impl AmbientSceneAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            id: AgentId::new(AGENT_ID),
            config,
            schema: plan_schema(),
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a motion designer who builds seamless ambient loops for music and \
meditation videos. You describe scenes a text-to-video model can render: concrete light, texture, and \
movement, never people's faces and never written text.";

impl StructuredAgent for AmbientSceneAgent {
    type Input = AmbientBrief;
    type Output = AmbientScenePlan;

    fn id(&self) -> &AgentId {
        &self.id
    }

    fn task(&self) -> &'static str {
        "plan ambient scene"
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn schema(&self, _input: &AmbientBrief) -> &OutputSchema {
        &self.schema
    }

    fn build_prompt(&self, input: &AmbientBrief) -> PromptPair {
        let intensity = input.intensity.min(100);
        let palette = input
            .palette_hint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Not specified");

        let user_prompt = format!(
            "MOOD: {}\n\
             SCENE: {}\n\
             INTENSITY: {}/100\n\
             LOOP LENGTH: {} seconds\n\
             PALETTE HINT: {}\n\n\
             RULES:\n\
             - visual_prompt: at most 600 characters, present tense, one continuous shot that loops cleanly.\n\
             - target_energy: a number from 0.0 to 1.0; start from INTENSITY / 100 and adjust for the mood.\n\
             - particle_type: one of none, dust, embers, snow, rain, fireflies, bokeh, smoke.\n\
             - camera_motion: one of static, slow_pan, slow_zoom_in, slow_zoom_out, orbit, drift. \
             High energy never means fast cuts; keep the camera slow.\n\
             - color_palette: 3 to 5 colors as #RRGGBB, darkest first.",
            input.mood.trim(),
            input.scene_description.trim(),
            intensity,
            input.duration_seconds,
            palette,
        );

        PromptPair::new(SYSTEM_PROMPT, user_prompt)
    }

    fn build_output(
        &self,
        _input: &AmbientBrief,
        parsed: Value,
        cost: Option<f64>,
    ) -> ReelsmithResult<AmbientScenePlan> {
        let mut plan: AmbientScenePlan = decode(&self.schema.name, parsed)?;
        plan.cost = cost;
        Ok(plan)
    }

    fn describe_input(&self, input: &AmbientBrief) -> String {
        format!("{} at {}/100", input.mood, input.intensity)
    }

    fn describe_output(&self, output: &AmbientScenePlan) -> String {
        format!(
            "energy {:.2}, {:?}, {:?}",
            output.target_energy, output.particle_type, output.camera_motion
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Campaign strategist agent.
//!
//! Turns a product brief into a shot-by-shot plan for a short social-commerce
//! video: an opening hook, a narrative arc, 3 to 8 ordered scenes, and a call
//! to action. When the brief carries a product photo the user message becomes
//! multimodal (label, image, then the brief itself) so the model can describe
//! what the product actually looks like.
//!
//! Scenes must be numbered 1..=n in order; the `sequential-scene-order` rule
//! checks this on our side since JSON Schema cannot.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use reelsmith_contracts::{
    agent::{AgentConfig, AgentId},
    error::ReelsmithResult,
    prompt::{ContentPart, PromptPair},
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use reelsmith_core::traits::StructuredAgent;
use reelsmith_verify::SchemaVerifier;

use crate::{decode::decode, language::detect_language};

pub const AGENT_ID: &str = "campaign-strategist";
pub const SEQUENTIAL_SCENE_ORDER: &str = "sequential-scene-order";

const NOT_SPECIFIED: &str = "Not specified";

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignObjective {
    Awareness,
    Consideration,
    Conversion,
}

impl CampaignObjective {
    fn guidance(self) -> &'static str {
        match self {
            CampaignObjective::Awareness => "Awareness: make the product memorable. Lead with emotion, not specs.",
            CampaignObjective::Consideration => {
                "Consideration: show the product solving a real problem. Demonstrate, then compare."
            }
            CampaignObjective::Conversion => {
                "Conversion: remove the last objection and ask for the purchase. Urgency is allowed, fake scarcity is not."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeBrief {
    pub product_name: String,
    pub product_description: String,
    #[serde(default)]
    pub target_audience: Option<String>,
    pub campaign_objective: CampaignObjective,
    pub duration_seconds: u32,
    /// 0 (calm) ..= 100 (frantic).
    pub energy: u8,
    #[serde(default)]
    pub brand_voice: Option<String>,
    #[serde(default)]
    pub product_image_url: Option<String>,
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeArc {
    ProblemSolution,
    BeforeAfter,
    Unboxing,
    Demonstration,
    Testimonial,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    CloseUp,
    Medium,
    Wide,
    ProductHero,
    Lifestyle,
    TextOverlay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub order: u32,
    pub description: String,
    pub shot_type: ShotType,
    pub duration_seconds: f64,
    pub on_screen_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignStrategy {
    pub hook: String,
    pub narrative_arc: NarrativeArc,
    pub scenes: Vec<Scene>,
    pub call_to_action: String,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl CampaignStrategy {
    pub fn total_duration_seconds(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration_seconds).sum()
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

fn strategy_schema() -> OutputSchema {
    let json_schema = json!({
        "type": "object",
        "properties": {
            "hook": { "type": "string", "minLength": 1, "maxLength": 90 },
            "narrative_arc": {
                "type": "string",
                "enum": ["problem_solution", "before_after", "unboxing", "demonstration", "testimonial", "story"]
            },
            "scenes": {
                "type": "array",
                "minItems": 3,
                "maxItems": 8,
                "items": {
                    "type": "object",
                    "properties": {
                        "order": { "type": "integer", "minimum": 1 },
                        "description": { "type": "string", "minLength": 1 },
                        "shot_type": {
                            "type": "string",
                            "enum": ["close_up", "medium", "wide", "product_hero", "lifestyle", "text_overlay"]
                        },
                        "duration_seconds": { "type": "number", "exclusiveMinimum": 0 },
                        "on_screen_text": { "type": "string", "maxLength": 40 }
                    },
                    "required": ["order", "description", "shot_type", "duration_seconds", "on_screen_text"],
                    "additionalProperties": false
                }
            },
            "call_to_action": { "type": "string", "minLength": 1, "maxLength": 40 }
        },
        "required": ["hook", "narrative_arc", "scenes", "call_to_action"],
        "additionalProperties": false
    });

    OutputSchema::new("campaign_strategy", json_schema)
        .with_rule(VerificationRule {
            rule_id: "first-scene-described".to_string(),
            description: "The plan opens with a described scene".to_string(),
            rule_type: VerificationRuleType::RequiredField {
                field_path: "scenes.0.description".to_string(),
            },
        })
        .with_rule(VerificationRule {
            rule_id: SEQUENTIAL_SCENE_ORDER.to_string(),
            description: "Scenes are numbered 1..=n in array order".to_string(),
            rule_type: VerificationRuleType::Custom {
                function_name: SEQUENTIAL_SCENE_ORDER.to_string(),
            },
        })
}

/// `None` when every scene's `order` equals its 1-based position.
pub fn check_scene_order(output: &Value) -> Option<String> {
    let scenes = output["scenes"].as_array()?;
    scenes.iter().enumerate().find_map(|(index, scene)| {
        let expected = index as u64 + 1;
        match scene["order"].as_u64() {
            Some(order) if order == expected => None,
            Some(order) => Some(format!("scene at position {expected} has order {order}")),
            None => Some(format!("scene at position {expected} has no integer order")),
        }
    })
}

pub fn register_rules(verifier: &mut SchemaVerifier) {
    verifier.register_rule(SEQUENTIAL_SCENE_ORDER, Box::new(check_scene_order));
}

// ── Agent ─────────────────────────────────────────────────────────────────────

pub fn default_config() -> AgentConfig {
    AgentConfig::new("openai", "gpt-4.1")
        .with_temperature(0.8)
        .with_expected_output_tokens(2048)
}

pub struct CampaignStrategistAgent {
    id: AgentId,
    config: AgentConfig,
    schema: OutputSchema,
}

impl CampaignStrategistAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            id: AgentId::new(AGENT_ID),
            config,
            schema: strategy_schema(),
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a performance creative strategist for social commerce brands. You plan \
short vertical videos that stop the scroll in the first second and sell without sounding like an ad. \
You think in shots, not paragraphs: every scene must be filmable with a phone and a product on a table.";

fn energy_label(energy: u8) -> &'static str {
    match energy {
        0..=33 => "calm",
        34..=66 => "upbeat",
        _ => "high-energy",
    }
}

fn or_default(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_SPECIFIED)
}

impl StructuredAgent for CampaignStrategistAgent {
    type Input = CreativeBrief;
    type Output = CampaignStrategy;

    fn id(&self) -> &AgentId {
        &self.id
    }

    fn task(&self) -> &'static str {
        "generate campaign strategy"
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn schema(&self, _input: &CreativeBrief) -> &OutputSchema {
        &self.schema
    }

    fn build_prompt(&self, input: &CreativeBrief) -> PromptPair {
        let energy = input.energy.min(100);
        let language =
            detect_language(&format!("{} {}", input.product_name, input.product_description));

        let brief = format!(
            "PRODUCT NAME: {}\n\
             PRODUCT DESCRIPTION: {}\n\
             TARGET AUDIENCE: {}\n\
             CAMPAIGN OBJECTIVE: {}\n\
             BRAND VOICE: {}\n\
             VIDEO DURATION: {} seconds\n\
             ENERGY: {}/100 ({})\n\n\
             RULES:\n\
             - hook: at most 90 characters, spoken in the first 2 seconds. \
             GOOD: \"I stopped buying coffee after this.\" BAD: \"Introducing our new product.\"\n\
             - narrative_arc: one of problem_solution, before_after, unboxing, demonstration, testimonial, story.\n\
             - scenes: 3 to 8, numbered from 1 in order. Scene durations should add up to about {} seconds.\n\
             - shot_type: one of close_up, medium, wide, product_hero, lifestyle, text_overlay.\n\
             - on_screen_text: at most 40 characters; use an empty string for no text.\n\
             - call_to_action: at most 40 characters.\n\n\
             {}",
            input.product_name.trim(),
            input.product_description.trim(),
            or_default(&input.target_audience),
            input.campaign_objective.guidance(),
            or_default(&input.brand_voice),
            input.duration_seconds,
            energy,
            energy_label(energy),
            input.duration_seconds,
            language.instruction(),
        );

        match input.product_image_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => PromptPair::new(
                SYSTEM_PROMPT,
                vec![
                    ContentPart::text("PRODUCT IMAGE:"),
                    ContentPart::image(url),
                    ContentPart::text(format!(
                        "Use the image for colors, packaging, and scale.\n\n{brief}"
                    )),
                ],
            ),
            _ => PromptPair::new(SYSTEM_PROMPT, brief),
        }
    }

    fn build_output(
        &self,
        _input: &CreativeBrief,
        parsed: Value,
        cost: Option<f64>,
    ) -> ReelsmithResult<CampaignStrategy> {
        let mut strategy: CampaignStrategy = decode(&self.schema.name, parsed)?;
        strategy.cost = cost;
        Ok(strategy)
    }

    fn describe_input(&self, input: &CreativeBrief) -> String {
        format!(
            "{} ({:?}, {}s, image: {})",
            input.product_name,
            input.campaign_objective,
            input.duration_seconds,
            input.product_image_url.is_some()
        )
    }

    fn describe_output(&self, output: &CampaignStrategy) -> String {
        format!("{:?} arc, {} scenes", output.narrative_arc, output.scenes.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reelsmith_contracts::{error::ReelsmithError, prompt::MessageContent};
    use reelsmith_core::AgentRunner;

    use super::*;
    use crate::language::{ARABIC_INSTRUCTION, ENGLISH_INSTRUCTION};
    use crate::test_support::{reply, ScriptedClient};

    fn brief() -> CreativeBrief {
        CreativeBrief {
            product_name: "Brewly".to_string(),
            product_description: "A pocket espresso maker that works without power".to_string(),
            target_audience: None,
            campaign_objective: CampaignObjective::Conversion,
            duration_seconds: 30,
            energy: 80,
            brand_voice: Some("playful".to_string()),
            product_image_url: None,
        }
    }

    fn strategy_json(orders: [u32; 3]) -> String {
        json!({
            "hook": "I stopped buying coffee after this.",
            "narrative_arc": "problem_solution",
            "scenes": [
                { "order": orders[0], "description": "Sad office coffee", "shot_type": "close_up", "duration_seconds": 8, "on_screen_text": "day 1" },
                { "order": orders[1], "description": "Brewly pulls a shot", "shot_type": "product_hero", "duration_seconds": 12, "on_screen_text": "" },
                { "order": orders[2], "description": "Happy sip outdoors", "shot_type": "lifestyle", "duration_seconds": 10, "on_screen_text": "link in bio" }
            ],
            "call_to_action": "Get yours today"
        })
        .to_string()
    }

    fn verifier() -> Arc<SchemaVerifier> {
        let mut verifier = SchemaVerifier::new();
        register_rules(&mut verifier);
        Arc::new(verifier)
    }

    // ── Prompt ────────────────────────────────────────────────────────────────

    #[test]
    fn test_text_prompt_without_image() {
        let prompt = CampaignStrategistAgent::new(default_config()).build_prompt(&brief());
        let MessageContent::Text(text) = &prompt.user_prompt else {
            panic!("expected a text prompt");
        };
        assert!(text.contains("PRODUCT NAME: Brewly"));
        assert!(text.contains("TARGET AUDIENCE: Not specified"));
        assert!(text.contains("BRAND VOICE: playful"));
        assert!(text.contains("ENERGY: 80/100 (high-energy)"));
        assert!(text.contains(ENGLISH_INSTRUCTION));
    }

    #[test]
    fn test_image_makes_prompt_multimodal_in_order() {
        let mut input = brief();
        input.product_image_url = Some("https://cdn.example.com/brewly.png".to_string());
        let prompt = CampaignStrategistAgent::new(default_config()).build_prompt(&input);

        assert!(prompt.user_prompt.is_multimodal());
        let MessageContent::Parts(parts) = &prompt.user_prompt else {
            panic!("expected content parts");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ContentPart::text("PRODUCT IMAGE:"));
        assert_eq!(parts[1], ContentPart::image("https://cdn.example.com/brewly.png"));
        assert!(matches!(&parts[2], ContentPart::InputText { text } if text.contains("CAMPAIGN OBJECTIVE")));
    }

    #[test]
    fn test_blank_image_url_stays_text() {
        let mut input = brief();
        input.product_image_url = Some("   ".to_string());
        let prompt = CampaignStrategistAgent::new(default_config()).build_prompt(&input);
        assert!(!prompt.user_prompt.is_multimodal());
    }

    #[test]
    fn test_arabic_brief_gets_arabic_instruction() {
        let mut input = brief();
        input.product_name = "بروولي".to_string();
        input.product_description = "آلة إسبريسو صغيرة تعمل بدون كهرباء".to_string();
        let text = CampaignStrategistAgent::new(default_config())
            .build_prompt(&input)
            .user_prompt
            .text();
        assert!(text.contains(ARABIC_INSTRUCTION));
        assert!(!text.contains(ENGLISH_INSTRUCTION));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let agent = CampaignStrategistAgent::new(default_config());
        let mut input = brief();
        input.product_image_url = Some("https://cdn.example.com/brewly.png".to_string());
        assert_eq!(agent.build_prompt(&input), agent.build_prompt(&input));
    }

    // ── Scene order rule ──────────────────────────────────────────────────────

    #[test]
    fn test_scene_order_rule() {
        let ok: Value = serde_json::from_str(&strategy_json([1, 2, 3])).unwrap();
        assert_eq!(check_scene_order(&ok), None);

        let skipped: Value = serde_json::from_str(&strategy_json([1, 3, 4])).unwrap();
        assert_eq!(
            check_scene_order(&skipped).as_deref(),
            Some("scene at position 2 has order 3")
        );
    }

    // ── End to end ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_strategy_returned_with_cost() {
        let client = ScriptedClient::new(vec![reply(&strategy_json([1, 2, 3]), 0.012)]);
        let runner = AgentRunner::new(Arc::new(client)).with_verifier(verifier());

        let strategy = runner
            .run(&CampaignStrategistAgent::new(default_config()), &brief())
            .await
            .unwrap();

        assert_eq!(strategy.narrative_arc, NarrativeArc::ProblemSolution);
        assert_eq!(strategy.scenes.len(), 3);
        assert_eq!(strategy.scenes[1].shot_type, ShotType::ProductHero);
        assert_eq!(strategy.total_duration_seconds(), 30.0);
        assert_eq!(strategy.cost, Some(0.012));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_scenes_are_retried() {
        let client = ScriptedClient::new(vec![
            reply(&strategy_json([2, 1, 3]), 0.01),
            reply(&strategy_json([1, 2, 3]), 0.01),
        ]);
        let runner = AgentRunner::new(Arc::new(client.clone())).with_verifier(verifier());

        let strategy = runner
            .run(&CampaignStrategistAgent::new(default_config()), &brief())
            .await
            .unwrap();

        assert_eq!(client.calls(), 2);
        assert_eq!(strategy.scenes[0].order, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_few_scenes_fail_verification() {
        let two_scenes = json!({
            "hook": "h",
            "narrative_arc": "story",
            "scenes": [
                { "order": 1, "description": "a", "shot_type": "wide", "duration_seconds": 5, "on_screen_text": "" },
                { "order": 2, "description": "b", "shot_type": "wide", "duration_seconds": 5, "on_screen_text": "" }
            ],
            "call_to_action": "buy"
        })
        .to_string();
        let client = ScriptedClient::new(vec![
            reply(&two_scenes, 0.0),
            reply(&two_scenes, 0.0),
            reply(&two_scenes, 0.0),
        ]);
        let runner = AgentRunner::new(Arc::new(client)).with_verifier(verifier());

        let err = runner
            .run(&CampaignStrategistAgent::new(default_config()), &brief())
            .await
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::VerificationFailed { .. }), "got {:?}", err);
    }

    #[test]
    fn test_unknown_shot_type_is_malformed() {
        let mut value: Value = serde_json::from_str(&strategy_json([1, 2, 3])).unwrap();
        value["scenes"][0]["shot_type"] = json!("drone");
        let err = CampaignStrategistAgent::new(default_config())
            .build_output(&brief(), value, None)
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::MalformedOutput { .. }));
    }
}

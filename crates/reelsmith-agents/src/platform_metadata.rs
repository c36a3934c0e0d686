//! Platform metadata agent.
//!
//! Writes the caption (and, for YouTube, the title) that accompanies a
//! finished video on one social platform. Each platform has its own output
//! schema, length limits, and hashtag budget; YouTube is the only platform
//! with a title.
//!
//! `generate_for_platforms` fans one call out per platform. A platform whose
//! call fails gets `PlatformMetadata::empty` instead of failing the batch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use reelsmith_contracts::{
    agent::{AgentConfig, AgentId},
    error::{ReelsmithError, ReelsmithResult},
    prompt::PromptPair,
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use reelsmith_core::{fan_out, traits::StructuredAgent, AgentRunner};
use reelsmith_verify::SchemaVerifier;

use crate::{decode::decode, language::detect_language};

pub const AGENT_ID: &str = "platform-metadata";

// ── Platforms ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Instagram,
    Youtube,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Tiktok,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Facebook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Tiktok => "TikTok",
            Platform::Instagram => "Instagram Reels",
            Platform::Youtube => "YouTube Shorts",
            Platform::Facebook => "Facebook Reels",
        }
    }

    pub fn has_title(self) -> bool {
        self == Platform::Youtube
    }

    /// Maximum caption length the schema allows.
    pub fn caption_limit(self) -> u64 {
        match self {
            Platform::Tiktok => 2200,
            Platform::Instagram => 2200,
            Platform::Youtube => 5000,
            Platform::Facebook => 2000,
        }
    }

    pub fn hashtag_limit(self) -> usize {
        match self {
            Platform::Tiktok => 5,
            Platform::Instagram => 10,
            Platform::Youtube => 3,
            Platform::Facebook => 3,
        }
    }

    fn style_rules(self) -> &'static str {
        match self {
            Platform::Tiktok => {
                "- Open with a curiosity hook of at most 8 words; no full sentences of setup.\n\
                 - Casual, lowercase-friendly voice. One or two emojis at most.\n\
                 - End with a blank line, then 2 to 5 hashtags on one line.\n\
                 - GOOD: \"wait for it... 👀\"  BAD: \"In this video we will show you our product.\""
            }
            Platform::Instagram => {
                "- First line must work on its own before the \"more\" cut (about 125 characters).\n\
                 - Two to four short lines, conversational, with a soft call to action.\n\
                 - End with a blank line, then up to 10 relevant hashtags."
            }
            Platform::Youtube => {
                "- Title: at most 100 characters, specific and searchable, no clickbait in all caps.\n\
                 - Caption: a 1-3 sentence description that restates what the viewer gets.\n\
                 - At most 3 hashtags, placed at the end of the caption."
            }
            Platform::Facebook => {
                "- One or two friendly sentences that invite a comment or share.\n\
                 - Hashtags are optional; never more than 3."
            }
        }
    }

    fn schema_name(self) -> String {
        format!("{}_metadata", self.as_str())
    }

    fn hashtag_rule_name(self) -> String {
        format!("{}-hashtag-limit", self.as_str())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Input and output ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRequest {
    pub platform: Platform,
    pub script_text: String,
    pub duration_seconds: u32,
}

/// Metadata for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub platform: Platform,
    /// YouTube only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub caption: String,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl PlatformMetadata {
    /// Stand-in for a platform whose generation failed.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            title: None,
            caption: String::new(),
            cost: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.caption.is_empty() && self.title.is_none()
    }
}

/// What the model actually returns.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataFields {
    #[serde(default)]
    title: Option<String>,
    caption: String,
}

// ── Schemas ───────────────────────────────────────────────────────────────────

fn platform_schema(platform: Platform) -> OutputSchema {
    let caption = json!({
        "type": "string",
        "minLength": 1,
        "maxLength": platform.caption_limit()
    });

    let json_schema = if platform.has_title() {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1, "maxLength": 100 },
                "caption": caption
            },
            "required": ["title", "caption"],
            "additionalProperties": false
        })
    } else {
        json!({
            "type": "object",
            "properties": { "caption": caption },
            "required": ["caption"],
            "additionalProperties": false
        })
    };

    OutputSchema::new(platform.schema_name(), json_schema).with_rule(VerificationRule {
        rule_id: platform.hashtag_rule_name(),
        description: format!(
            "{} metadata carries at most {} hashtags",
            platform.display_name(),
            platform.hashtag_limit()
        ),
        rule_type: VerificationRuleType::Custom {
            function_name: platform.hashtag_rule_name(),
        },
    })
}

/// Number of `#tag` words across the caption and title.
pub fn count_hashtags(output: &Value) -> usize {
    ["caption", "title"]
        .iter()
        .filter_map(|field| output[*field].as_str())
        .flat_map(str::split_whitespace)
        .filter(|word| word.len() > 1 && word.starts_with('#'))
        .count()
}

/// Register the per-platform hashtag-limit rules.
pub fn register_rules(verifier: &mut SchemaVerifier) {
    for platform in Platform::ALL {
        let limit = platform.hashtag_limit();
        verifier.register_rule(
            platform.hashtag_rule_name(),
            Box::new(move |output: &Value| {
                let found = count_hashtags(output);
                (found > limit).then(|| {
                    format!("{found} hashtags exceed the {} limit of {limit}", platform.display_name())
                })
            }),
        );
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

struct PlatformSchemas {
    tiktok: OutputSchema,
    instagram: OutputSchema,
    youtube: OutputSchema,
    facebook: OutputSchema,
}

impl PlatformSchemas {
    fn build() -> Self {
        Self {
            tiktok: platform_schema(Platform::Tiktok),
            instagram: platform_schema(Platform::Instagram),
            youtube: platform_schema(Platform::Youtube),
            facebook: platform_schema(Platform::Facebook),
        }
    }

    fn get(&self, platform: Platform) -> &OutputSchema {
        match platform {
            Platform::Tiktok => &self.tiktok,
            Platform::Instagram => &self.instagram,
            Platform::Youtube => &self.youtube,
            Platform::Facebook => &self.facebook,
        }
    }
}

pub fn default_config() -> AgentConfig {
    AgentConfig::new("openai", "gpt-4.1-mini")
        .with_temperature(0.9)
        .with_expected_output_tokens(600)
}

pub struct PlatformMetadataAgent {
    id: AgentId,
    config: AgentConfig,
    schemas: PlatformSchemas,
}

impl PlatformMetadataAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            id: AgentId::new(AGENT_ID),
            config,
            schemas: PlatformSchemas::build(),
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a social media copywriter who writes the text that ships with short-form \
vertical videos. You know each platform's conventions and you never describe the video literally; you make \
people want to watch it. Answer with a single JSON object that matches the requested schema and nothing else.";

impl StructuredAgent for PlatformMetadataAgent {
    type Input = MetadataRequest;
    type Output = PlatformMetadata;

    fn id(&self) -> &AgentId {
        &self.id
    }

    fn task(&self) -> &'static str {
        "generate platform metadata"
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn schema(&self, input: &MetadataRequest) -> &OutputSchema {
        self.schemas.get(input.platform)
    }

    fn build_prompt(&self, input: &MetadataRequest) -> PromptPair {
        let platform = input.platform;
        let script = input.script_text.trim();
        let script = if script.is_empty() { "Not specified" } else { script };
        let fields = if platform.has_title() {
            "a \"title\" and a \"caption\""
        } else {
            "a \"caption\""
        };

        let user_prompt = format!(
            "PLATFORM: {}\n\
             VIDEO DURATION: {} seconds\n\
             VIDEO SCRIPT:\n{}\n\n\
             RULES:\n{}\n\
             - Caption length: at most {} characters.\n\
             - Hashtags: at most {}.\n\n\
             {}\n\n\
             Return {} for this video.",
            platform.display_name(),
            input.duration_seconds,
            script,
            platform.style_rules(),
            platform.caption_limit(),
            platform.hashtag_limit(),
            detect_language(&input.script_text).instruction(),
            fields,
        );

        PromptPair::new(SYSTEM_PROMPT, user_prompt)
    }

    fn build_output(
        &self,
        input: &MetadataRequest,
        parsed: Value,
        cost: Option<f64>,
    ) -> ReelsmithResult<PlatformMetadata> {
        let schema = self.schemas.get(input.platform);
        let fields: MetadataFields = decode(&schema.name, parsed)?;

        let title = if input.platform.has_title() {
            match fields.title {
                Some(title) => Some(title),
                None => {
                    return Err(ReelsmithError::MalformedOutput {
                        reason: format!("{} is missing a title", schema.name),
                    })
                }
            }
        } else {
            None
        };

        Ok(PlatformMetadata {
            platform: input.platform,
            title,
            caption: fields.caption,
            cost,
        })
    }

    fn describe_input(&self, input: &MetadataRequest) -> String {
        format!(
            "{} {}s, {} script chars",
            input.platform,
            input.duration_seconds,
            input.script_text.chars().count()
        )
    }

    fn describe_output(&self, output: &PlatformMetadata) -> String {
        format!("{} caption chars", output.caption.chars().count())
    }
}

// ── Fan-out ───────────────────────────────────────────────────────────────────

/// Generate metadata for every platform in `platforms` concurrently.
///
/// Returns one entry per platform, in the given order. Platforms whose call
/// failed after all retries carry `PlatformMetadata::empty`.
pub async fn generate_for_platforms(
    runner: &AgentRunner,
    agent: &PlatformMetadataAgent,
    platforms: &[Platform],
    script_text: &str,
    duration_seconds: u32,
) -> Vec<PlatformMetadata> {
    let requests: Vec<MetadataRequest> = platforms
        .iter()
        .map(|&platform| MetadataRequest {
            platform,
            script_text: script_text.to_string(),
            duration_seconds,
        })
        .collect();

    fan_out(
        AGENT_ID,
        &requests,
        |request| runner.run(agent, request),
        |request| PlatformMetadata::empty(request.platform),
    )
    .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

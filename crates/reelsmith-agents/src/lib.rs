//! # reelsmith-agents
//!
//! The concrete agents of the REELSMITH video pipeline.
//!
//! | Module                | Agent id              | Input → Output                          |
//! |-----------------------|-----------------------|-----------------------------------------|
//! | `campaign_strategist` | `campaign-strategist` | `CreativeBrief` → `CampaignStrategy`    |
//! | `ambient_scene`       | `ambient-scene`       | `AmbientBrief` → `AmbientScenePlan`     |
//! | `platform_metadata`   | `platform-metadata`   | `MetadataRequest` → `PlatformMetadata`  |
//!
//! Each module exposes `AGENT_ID`, a built-in `default_config()`, and an
//! agent type constructed from an `AgentConfig`. Agents are pure: they build
//! prompts, name their schema, and repackage parsed output. Calls go through
//! `reelsmith_core::AgentRunner`.
//!
//! Modules with custom verification rules expose `register_rules`;
//! `register_all_rules` wires every one of them into a `SchemaVerifier`.

pub mod ambient_scene;
pub mod campaign_strategist;
pub mod language;
pub mod platform_metadata;

mod decode;

#[cfg(test)]
mod test_support;

use reelsmith_verify::SchemaVerifier;

pub use ambient_scene::{AmbientBrief, AmbientSceneAgent, AmbientScenePlan};
pub use campaign_strategist::{CampaignStrategistAgent, CampaignStrategy, CreativeBrief};
pub use language::{detect_language, Language};
pub use platform_metadata::{
    generate_for_platforms, MetadataRequest, Platform, PlatformMetadata, PlatformMetadataAgent,
};

/// Register the custom rules of every agent in this crate.
pub fn register_all_rules(verifier: &mut SchemaVerifier) {
    campaign_strategist::register_rules(verifier);
    platform_metadata::register_rules(verifier);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use reelsmith_verify::SchemaVerifier;

    use super::*;

    #[test]
    fn test_register_all_rules() {
        let mut verifier = SchemaVerifier::new();
        register_all_rules(&mut verifier);

        assert!(verifier.has_rule(campaign_strategist::SEQUENTIAL_SCENE_ORDER));
        for platform in Platform::ALL {
            assert!(verifier.has_rule(&format!("{platform}-hashtag-limit")), "{platform}");
        }
    }

    #[test]
    fn test_agent_ids_are_distinct() {
        let ids = [
            campaign_strategist::AGENT_ID,
            ambient_scene::AGENT_ID,
            platform_metadata::AGENT_ID,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

//! REELSMITH: command-line agent runner.
//!
//! Runs one agent against a live provider and prints its output as JSON,
//! followed by a usage summary from the in-memory ledger.
//!
//! Usage:
//!   reelsmith campaign --product-name Brewly --product-description "Pocket espresso maker"
//!   reelsmith ambient --mood cozy --scene "cabin window in a snowstorm"
//!   reelsmith metadata --script "Check this out!" --platform tiktok --platform youtube
//!   reelsmith --config reelsmith.toml metadata --script "..."
//!
//! The API key is read from the environment variable named by the provider's
//! `api_key_env` (`OPENAI_API_KEY` by default). A `.env` file in the working
//! directory is loaded first.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reelsmith_agents::{
    ambient_scene, campaign_strategist,
    campaign_strategist::CampaignObjective,
    generate_for_platforms, platform_metadata, register_all_rules, AmbientBrief, AmbientSceneAgent,
    CampaignStrategistAgent, CreativeBrief, MetadataRequest, Platform, PlatformMetadataAgent,
};
use reelsmith_config::Settings;
use reelsmith_contracts::{
    agent::{AgentId, CallerIdentity},
    error::{ReelsmithError, ReelsmithResult},
};
use reelsmith_core::AgentRunner;
use reelsmith_provider::ProviderRouter;
use reelsmith_usage::InMemoryUsageLedger;
use reelsmith_verify::SchemaVerifier;

/// Used when no `--config` is given.
const DEFAULT_SETTINGS: &str = r#"
[providers.openai]
base_url = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"
"#;

// ── CLI definition ────────────────────────────────────────────────────────────

/// REELSMITH: structured LLM agents for short-form video.
#[derive(Parser)]
#[command(
    name = "reelsmith",
    about = "Run REELSMITH video agents from the command line",
    long_about = "Runs one REELSMITH agent with retries and output verification,\n\
                  then prints the result as JSON and a usage summary."
)]
struct Cli {
    /// TOML settings file (providers, defaults, per-agent overrides).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User id forwarded to the provider for usage attribution.
    #[arg(long, global = true)]
    user_id: Option<String>,

    #[arg(long, global = true)]
    workspace_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a social-commerce video from a product brief.
    Campaign {
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        product_description: String,
        #[arg(long)]
        target_audience: Option<String>,
        #[arg(long, value_enum, default_value_t = ObjectiveArg::Awareness)]
        objective: ObjectiveArg,
        #[arg(long, default_value_t = 30)]
        duration: u32,
        /// 0 (calm) to 100 (frantic).
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        energy: u8,
        #[arg(long)]
        brand_voice: Option<String>,
        /// Product photo URL; makes the request multimodal.
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Plan an ambient background loop for a mood.
    Ambient {
        #[arg(long)]
        mood: String,
        #[arg(long)]
        scene: String,
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        intensity: u8,
        #[arg(long, default_value_t = 60)]
        duration: u32,
        #[arg(long)]
        palette: Option<String>,
    },
    /// Write captions (and a YouTube title) for one or more platforms.
    Metadata {
        #[arg(long)]
        script: String,
        /// Repeat for several platforms; they are generated concurrently.
        #[arg(long = "platform", value_enum, default_values_t = vec![PlatformArg::Tiktok])]
        platforms: Vec<PlatformArg>,
        #[arg(long, default_value_t = 30)]
        duration: u32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ObjectiveArg {
    Awareness,
    Consideration,
    Conversion,
}

impl From<ObjectiveArg> for CampaignObjective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::Awareness => CampaignObjective::Awareness,
            ObjectiveArg::Consideration => CampaignObjective::Consideration,
            ObjectiveArg::Conversion => CampaignObjective::Conversion,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    Tiktok,
    Instagram,
    Youtube,
    Facebook,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Tiktok => Platform::Tiktok,
            PlatformArg::Instagram => Platform::Instagram,
            PlatformArg::Youtube => Platform::Youtube,
            PlatformArg::Facebook => Platform::Facebook,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug to see every attempt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "loaded environment file");
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("reelsmith error: {}", e);
        std::process::exit(1);
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn load_settings(path: Option<&PathBuf>) -> ReelsmithResult<Settings> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::from_toml_str(DEFAULT_SETTINGS),
    }
}

async fn run(cli: Cli) -> ReelsmithResult<()> {
    let settings = load_settings(cli.config.as_ref())?;
    let router = ProviderRouter::from_settings(&settings, |var| std::env::var(var).ok())?;

    let mut verifier = SchemaVerifier::new();
    register_all_rules(&mut verifier);

    let ledger = InMemoryUsageLedger::new();
    let runner = AgentRunner::new(Arc::new(router))
        .with_verifier(Arc::new(verifier))
        .with_recorder(Arc::new(ledger.clone()))
        .with_caller(CallerIdentity {
            user_id: cli.user_id,
            workspace_id: cli.workspace_id,
        });

    match cli.command {
        Command::Campaign {
            product_name,
            product_description,
            target_audience,
            objective,
            duration,
            energy,
            brand_voice,
            image_url,
        } => {
            let config = settings.agent_config(
                &AgentId::new(campaign_strategist::AGENT_ID),
                campaign_strategist::default_config(),
            )?;
            let brief = CreativeBrief {
                product_name,
                product_description,
                target_audience,
                campaign_objective: objective.into(),
                duration_seconds: duration,
                energy,
                brand_voice,
                product_image_url: image_url,
            };
            let strategy = runner.run(&CampaignStrategistAgent::new(config), &brief).await?;
            print_json(&strategy)?;
        }

        Command::Ambient {
            mood,
            scene,
            intensity,
            duration,
            palette,
        } => {
            let config = settings.agent_config(
                &AgentId::new(ambient_scene::AGENT_ID),
                ambient_scene::default_config(),
            )?;
            let brief = AmbientBrief {
                mood,
                scene_description: scene,
                intensity,
                duration_seconds: duration,
                palette_hint: palette,
            };
            let plan = runner.run(&AmbientSceneAgent::new(config), &brief).await?;
            print_json(&plan)?;
        }

        Command::Metadata {
            script,
            platforms,
            duration,
        } => {
            let config = settings.agent_config(
                &AgentId::new(platform_metadata::AGENT_ID),
                platform_metadata::default_config(),
            )?;
            let agent = PlatformMetadataAgent::new(config);
            let platforms: Vec<Platform> = platforms.into_iter().map(Platform::from).collect();

            // A single platform surfaces its error; a batch degrades per platform.
            if let [platform] = platforms.as_slice() {
                let request = MetadataRequest {
                    platform: *platform,
                    script_text: script,
                    duration_seconds: duration,
                };
                let metadata = runner.run(&agent, &request).await?;
                print_json(&metadata)?;
            } else {
                let batch = generate_for_platforms(&runner, &agent, &platforms, &script, duration).await;
                print_json(&batch)?;
            }
        }
    }

    print_usage(&ledger)
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> ReelsmithResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ReelsmithError::MalformedOutput {
        reason: format!("failed to serialize output: {}", e),
    })?;
    println!("{json}");
    Ok(())
}

fn print_usage(ledger: &InMemoryUsageLedger) -> ReelsmithResult<()> {
    let report = ledger.export_report()?;
    println!();
    println!("Usage");
    println!("=====");
    for line in report.summary_lines() {
        println!("  {line}");
    }
    println!("  total: ${:.6}", report.total_cost_usd);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

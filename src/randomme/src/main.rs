//! RandomMe CLI — manage topics stored as JSON files, preview the policy's
//! probabilities, randomise an option and feed the outcome back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use randomme_core::{AppConfig, OutcomeResolution, PolicyId, Topic};
use randomme_rl_engine::DecisionEngine;
use tracing::info;

#[derive(Parser)]
#[command(name = "randomme")]
#[command(about = "Multi-armed bandit decisions over a topic's options")]
#[command(version)]
struct Cli {
    /// Optional TOML config file (environment variables `RANDOMME__*` override it)
    #[arg(long, global = true, env = "RANDOMME_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty topic file using the multinomial policy
    NewTopic {
        /// Topic name
        #[arg(short, long)]
        name: String,

        /// Initial policy (defaults to MULTINOMIAL)
        #[arg(short, long, value_parser = parse_policy)]
        policy: Option<PolicyId>,

        /// Topic file to create
        #[arg(short, long)]
        topic: PathBuf,
    },

    /// Add an option (arm) to a topic
    AddOption {
        #[arg(short, long)]
        topic: PathBuf,

        /// Option name
        #[arg(short, long)]
        name: String,

        /// Static weight used by the multinomial policy
        #[arg(short, long, default_value = "1")]
        bias: f64,
    },

    /// Remove an option from a topic
    RemoveOption {
        #[arg(short, long)]
        topic: PathBuf,

        #[arg(short, long)]
        arm_id: String,
    },

    /// Change the policy used for the next decisions
    SetPolicy {
        #[arg(short, long)]
        topic: PathBuf,

        #[arg(short, long, value_parser = parse_policy)]
        policy: PolicyId,
    },

    /// Show every option's probability, highest first
    Preview {
        #[arg(short, long)]
        topic: PathBuf,

        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Randomise one option
    Decide {
        #[arg(short, long)]
        topic: PathBuf,

        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record the outcome of a decision and advance the iteration counter
    Resolve {
        #[arg(short, long)]
        topic: PathBuf,

        #[arg(short, long)]
        arm_id: String,

        /// Reward signal, 1 when the choice was accepted and 0 otherwise
        #[arg(short, long)]
        reward: f64,
    },

    /// List the available policies
    Policies,
}

fn parse_policy(s: &str) -> Result<PolicyId, String> {
    s.trim()
        .to_uppercase()
        .replace('-', "_")
        .parse()
        .map_err(|e: randomme_core::MabError| e.to_string())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "randomme=info,randomme_core=info,randomme_rl_engine=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_topic(path: &Path) -> anyhow::Result<Topic> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading topic file {}", path.display()))?;
    let topic = serde_json::from_str(&raw)
        .with_context(|| format!("parsing topic file {}", path.display()))?;
    Ok(topic)
}

fn save_topic(path: &Path, topic: &Topic) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(topic)?;
    fs::write(path, raw).with_context(|| format!("writing topic file {}", path.display()))?;
    Ok(())
}

fn rng_from(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let engine = DecisionEngine::new(config.engine);

    match cli.command {
        Commands::NewTopic {
            name,
            policy,
            topic,
        } => {
            let mut new_topic = Topic::new(name);
            if let Some(policy) = policy {
                new_topic.set_policy(policy);
            }
            save_topic(&topic, &new_topic)?;
            info!(topic_id = %new_topic.id, path = %topic.display(), "Topic created");
            print_json(&new_topic)
        }
        Commands::AddOption { topic, name, bias } => {
            let mut current = load_topic(&topic)?;
            let arm_id = current.add_arm(name, bias)?;
            save_topic(&topic, &current)?;
            info!(topic_id = %current.id, arm_id = %arm_id, "Option added");
            print_json(&current.arm(&arm_id))
        }
        Commands::RemoveOption { topic, arm_id } => {
            let mut current = load_topic(&topic)?;
            let removed = current.remove_arm(&arm_id)?;
            save_topic(&topic, &current)?;
            info!(topic_id = %current.id, arm_id = %arm_id, "Option removed");
            print_json(&removed)
        }
        Commands::SetPolicy { topic, policy } => {
            let mut current = load_topic(&topic)?;
            current.set_policy(policy);
            save_topic(&topic, &current)?;
            info!(topic_id = %current.id, policy = %policy, "Policy changed");
            print_json(&current)
        }
        Commands::Preview { topic, seed } => {
            let current = load_topic(&topic)?;
            let mut rng = rng_from(seed);
            print_json(&engine.preview_with(&current, rng.as_mut())?)
        }
        Commands::Decide { topic, seed } => {
            let current = load_topic(&topic)?;
            let mut rng = rng_from(seed);
            let decision = engine.decide_with(&current, rng.as_mut())?;
            if decision.is_empty() {
                info!(topic_id = %current.id, "Topic has no options to randomise");
            }
            print_json(&decision)
        }
        Commands::Resolve {
            topic,
            arm_id,
            reward,
        } => {
            let mut current = load_topic(&topic)?;
            let state = current.resolve(&OutcomeResolution { arm_id, reward })?;
            save_topic(&topic, &current)?;
            print_json(&state)
        }
        Commands::Policies => {
            for policy in PolicyId::ALL {
                println!("{:<16} {}", policy.as_tag(), policy.display_name());
            }
            Ok(())
        }
    }
}

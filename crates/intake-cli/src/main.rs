//! Intake CLI - Command-line interface
//!
//! Usage:
//!   intake extract --field name:name --field years:number <text>
//!   intake extract --descriptors fields.json <text>
//!   intake sentiment <text>
//!   intake skills <text>

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use intake_core::{parse_descriptors, EngineConfig, FieldDescriptor, FieldType, LoggingConfig};
use intake_extractor::ExtractionEngine;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Candidate information extraction CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip loading the entity recognizer
    #[arg(long, global = true)]
    no_model: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract typed fields from an utterance
    Extract {
        /// Field as `id:type`, repeatable
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<FieldDescriptor>,

        /// JSON file holding an array of field descriptors
        #[arg(long)]
        descriptors: Option<PathBuf>,

        /// Utterance to analyze
        text: String,
    },
    /// Estimate sentiment of an utterance
    Sentiment {
        /// Utterance to analyze
        text: String,
    },
    /// List technology skills mentioned in an utterance
    Skills {
        /// Utterance to analyze
        text: String,
    },
}

fn parse_field(s: &str) -> Result<FieldDescriptor, String> {
    let (id, field_type) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `id:type`, got `{s}`"))?;

    if id.trim().is_empty() {
        return Err(format!("empty field id in `{s}`"));
    }

    Ok(FieldDescriptor::new(
        id.trim(),
        FieldType::parse_lenient(field_type),
    ))
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?.with_env_override()?,
        None => EngineConfig::from_env()?,
    };
    Ok(config)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "intake_cli={0},intake_extractor={0},intake_core={0}",
            config.level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli)?;
    if cli.no_model {
        config.nlp.enabled = false;
    }

    init_logging(&config.logging);
    tracing::debug!(?config, "Configuration loaded");

    let engine = ExtractionEngine::from_config(&config.nlp);

    let output = match cli.command {
        Commands::Extract {
            mut fields,
            descriptors,
            text,
        } => {
            if let Some(path) = descriptors {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading descriptors from {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing descriptors in {}", path.display()))?;
                fields.extend(parse_descriptors(&value)?);
            }
            if fields.is_empty() {
                anyhow::bail!("no fields given; use --field id:type or --descriptors <file>");
            }

            let result = engine.extract_information(&text, &fields).await?;
            json!({
                "model_loaded": engine.is_model_loaded(),
                "fields": result,
            })
        }
        Commands::Sentiment { text } => {
            let sentiment = engine.analyze_sentiment(&text).await;
            json!({
                "model_loaded": engine.is_model_loaded(),
                "sentiment": sentiment,
            })
        }
        Commands::Skills { text } => {
            let skills = engine.extract_skills(&text).await;
            json!({
                "model_loaded": engine.is_model_loaded(),
                "skills": skills,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

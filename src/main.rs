//! Siyaj - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use siyaj_core::cli::{Cli, Commands};
use siyaj_core::constants::{APP_NAME, APP_VERSION};
use siyaj_core::logic::explain::{explain_alert, playbook};
use siyaj_core::logic::ingest::read_rows;
use siyaj_core::{TriageConfig, TriageContext};

fn config_from(cli: &Cli) -> TriageConfig {
    let mut config = TriageConfig::from_env();
    if let Some(dir) = &cli.models {
        config.model_dir = dir.clone();
    }
    if let Some(q) = cli.quantile {
        config.quantile = q;
    }
    if let Some(k) = cli.top_k {
        config.top_k = k;
    }
    if let Some(policy) = cli.cluster_policy {
        config.cluster_policy = policy;
    }
    config
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config = config_from(&cli);
    let model_dir = config.model_dir.clone();
    let context = TriageContext::load(config)
        .with_context(|| format!("failed to load models from {}", model_dir.display()))?;

    match &cli.command {
        Commands::Schema => print_json(&context.schema().info())?,

        Commands::Score { input } => {
            let batch = read_rows(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let scored = context.score_ingested(&batch)?;
            print_json(&json!({
                "summary": scored.summary(),
                "rows": scored.reports(),
            }))?;
        }

        Commands::Alert { input, row, explain } => {
            let batch = read_rows(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let scored = context.score_ingested(&batch)?;
            let alert = scored
                .alert(*row, chrono::Utc::now())
                .with_context(|| format!("cannot build alert for row {}", row))?;

            if *explain {
                let assistant = explain_alert(&alert);
                let rule_playbook = playbook(&alert.hypothesis.label, alert.ml.severity);
                print_json(&json!({
                    "alert": alert,
                    "playbook": rule_playbook,
                    "assistant": assistant,
                }))?;
            } else {
                print_json(&alert)?;
            }
        }
    }

    Ok(())
}

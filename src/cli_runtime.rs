use anyhow::{Context, Result};
use clap::Parser;

use infracat::catalog::FieldCatalog;
use infracat::config::{ClusterOptions, Settings};
use infracat::logging::init_logging;
use infracat::presets::load_presets;
use infracat::registry;

use crate::{Cli, Commands};

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    let log_dir = cli.log_dir.clone().or_else(|| settings.log_dir.clone());
    let _log_guard = init_logging(log_dir.as_deref())?;

    match cli.command {
        Some(Commands::List { json }) => list(&settings, json),
        None => {
            let catalog = FieldCatalog::load(&cli.fields)?;
            let presets = load_presets(&settings.presets_path)?;
            if presets.is_empty() {
                anyhow::bail!("no presets found in {}", settings.presets_path.display());
            }
            let options = ClusterOptions::load_or_default(&cli.clusters);
            tracing::info!(
                presets = presets.len(),
                clusters = options.clusters.len(),
                "starting session"
            );

            infracat::tui::run_with_options(infracat::tui::TuiRunOptions {
                settings,
                catalog,
                presets,
                options,
            })
        }
    }
}

fn list(settings: &Settings, json: bool) -> Result<()> {
    let deployments = registry::list(&settings.apps_path)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&deployments).context("serialize deployments json")?
        );
        return Ok(());
    }

    for d in deployments {
        println!(
            "{:<40} {:<12} {:<17} {}",
            d.name, d.state, d.last_action, d.description
        );
    }
    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli_runtime;

#[derive(Parser)]
#[command(name = "infracat")]
#[command(about = "Terminal launcher for infrastructure deployments", long_about = None)]
pub(crate) struct Cli {
    /// Settings file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Field labels, help text and types
    #[arg(long, default_value = "fields.yaml")]
    fields: PathBuf,

    /// Optional cluster and zone overrides
    #[arg(long, default_value = "clusters.yaml")]
    clusters: PathBuf,

    /// Write logs here (overrides `log_dir` from the settings file)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List deployments and their lifecycle state
    List {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(err) = cli_runtime::run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

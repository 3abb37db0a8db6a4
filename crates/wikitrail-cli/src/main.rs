use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "wikitrail")]
#[command(about = "Wikitrail - browsing sessions and click-through chains for one wiki", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding sessions.toml and active_tabs.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Also write logs to a daily rolling file in the logs directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every recorded session as one JSON document
    Export {
        /// Output file or directory (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print sessions grouped into click-through chains
    Chains {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Feed recorded host events (JSON lines) through the tracker
    Replay {
        /// File with one host event per line
        events: PathBuf,

        /// Tabs that exist right now; enables startup reconciliation
        #[arg(long = "live-tab")]
        live_tabs: Vec<i64>,
    },
    /// Drop index entries for tabs that no longer exist
    Reconcile {
        /// Tabs that exist right now
        #[arg(long = "live-tab")]
        live_tabs: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let context = commands::Context::load(cli.config, cli.data_dir)?;

    let _log_guard = logging::init(&context.paths, cli.log_file)?;
    tracing::debug!(path = %context.config_file.display(), "Loaded configuration");

    match cli.command {
        Commands::Export { output } => commands::export::run(&context, output).await?,
        Commands::Chains { json } => commands::chains::run(&context, json).await?,
        Commands::Replay { events, live_tabs } => {
            commands::replay::run(&context, &events, live_tabs).await?
        }
        Commands::Reconcile { live_tabs } => commands::reconcile::run(&context, live_tabs).await?,
    }

    Ok(())
}

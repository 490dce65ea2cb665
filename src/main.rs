use anyhow::Result;
use cc_sync::config::Config;
use cc_sync::display::DisplayManager;
use cc_sync::logging::init_logging;
use cc_sync::sync::{SyncEngine, SyncOptions};
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "cc-sync")]
#[command(about = "Sync Claude Code native logs into a daily activity journal and usage totals")]
#[command(version)]
struct Cli {
    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
    /// Reset sync state and resync everything
    #[arg(long, conflicts_with = "stats")]
    reset: bool,
    /// Print cumulative usage totals without syncing
    #[arg(long)]
    stats: bool,
    /// Show the last N days in --stats output
    #[arg(long, requires = "stats")]
    limit: Option<usize>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
    /// Configuration file to use instead of the default locations
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        handle_error(e, cli.json);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let _guard = init_logging(&config.logging, &config.paths.log_dir());

    let engine = SyncEngine::from_config(&config)?;
    let display = DisplayManager::new(cli.json);

    if cli.stats {
        display.display_stats(&engine.stats(), cli.limit);
        return Ok(());
    }

    let report = engine.run(&SyncOptions { reset: cli.reset })?;
    if !cli.quiet || cli.json {
        display.display_sync_report(&report, &config.paths.data_dir);
    }
    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}

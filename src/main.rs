use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use signal_bot::bot::SignalBot;
use signal_bot::cli::Cli;
use signal_bot::config::Config;
use signal_bot::data_loader;
use signal_bot::models::TokenSnapshot;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match &cli.log_file {
        Some(path) => signal_bot::logging::init(&path.to_string_lossy(), max_level)?,
        None => {
            env_logger::Builder::from_default_env()
                .filter_level(max_level)
                .init();
        }
    }

    info!("Starting signal bot...");

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .map_err(|e| anyhow::anyhow!("Configuration loading failed: {}", e))?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };
    let config = Arc::new(config);

    let tracked_whales: HashSet<String> = match &cli.whale_wallets {
        Some(path) => data_loader::load_tracked_whales(path),
        None => HashSet::new(),
    };
    info!("Tracking {} whale wallets", tracked_whales.len());

    let mut bot = SignalBot::new(config, tracked_whales);

    match cli.watch {
        None => {
            let snapshots = load_batch(&cli.snapshots, &cli.candles)?;
            let events = bot.evaluate_cycle(snapshots);
            info!("Run complete: {} signals generated", events.len());
        }
        Some(seconds) => {
            let mut ticker = interval(Duration::from_secs(seconds.max(1)));
            loop {
                ticker.tick().await;
                match load_batch(&cli.snapshots, &cli.candles) {
                    Ok(snapshots) => {
                        let events = bot.evaluate_cycle(snapshots);
                        info!("Cycle produced {} signals", events.len());
                    }
                    Err(e) => {
                        log::error!("Snapshot reload failed, retrying next cycle: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Loads the snapshot batch and attaches each token's candle history when
/// the snapshot itself did not carry one.
fn load_batch(
    snapshots_path: &Path,
    candles_dir: &Path,
) -> signal_bot::Result<Vec<TokenSnapshot>> {
    let mut snapshots = data_loader::load_token_snapshots(snapshots_path)?;
    for snapshot in &mut snapshots {
        if snapshot.historical_candle_data.is_empty() {
            snapshot.historical_candle_data =
                data_loader::load_historical_data(&snapshot.token_id, candles_dir);
        }
    }
    Ok(snapshots)
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file with the batch of token snapshots to evaluate
    #[arg(long, default_value = "data/token_snapshots.json")]
    pub snapshots: PathBuf,

    /// Directory holding per-token {tokenId}_ohlcv.json candle files
    #[arg(long, default_value = "data/historical")]
    pub candles: PathBuf,

    /// Newline-delimited file of tracked whale wallet addresses
    #[arg(long)]
    pub whale_wallets: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Re-evaluate every N seconds instead of running once
    #[arg(long)]
    pub watch: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

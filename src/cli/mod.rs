//! Command-line parsing for the trade-up calculator.
//!
//! Argument parsing and command dispatch stay separate from the engine and
//! session code.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::domain::Rarity;
use crate::session::SessionConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tradeup", version, about = "Trade-up outcome calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the trade-up for a card file once and print the report.
    Calc(CalcArgs),
    /// Watch a card file and recompute whenever it changes.
    ///
    /// The file stands in for the trade-up dialog: present means open,
    /// a content change means the set of cards changed.
    Watch(WatchArgs),
    /// Generate a synthetic card file from catalog records of one tier.
    Sample(SampleArgs),
}

/// Where the reference catalog comes from.
#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Catalog URL or local JSON path. Defaults to `TRADEUP_CATALOG`, then the public catalog.
    #[arg(long, value_name = "SRC")]
    pub catalog: Option<String>,

    /// Give up on the catalog fetch after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout_secs: Option<u64>,
}

impl CatalogArgs {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Args, Clone)]
pub struct CalcArgs {
    /// Card file (JSON array of displayed cards).
    #[arg(long, value_name = "JSON")]
    pub cards: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    /// Card file to watch.
    #[arg(long, value_name = "JSON")]
    pub cards: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Print reports to stdout instead of running the terminal UI.
    #[arg(long)]
    pub plain: bool,

    /// Quiet period after the last change before recomputing.
    #[arg(long, default_value_t = 200)]
    pub debounce_ms: u64,
}

impl WatchArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            fetch_timeout: self.catalog.fetch_timeout(),
            ..SessionConfig::default()
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Input tier of the generated cards.
    #[arg(short = 'r', long, value_enum)]
    pub rarity: Rarity,

    /// Only draw from this collection.
    #[arg(long)]
    pub collection: Option<String>,

    /// Number of cards to generate.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    /// Random seed for reproducible samples.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write the card file here instead of stdout.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}

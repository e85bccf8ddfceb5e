//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module is the
//! real main: it parses arguments, installs logging, builds the runtime and
//! dispatches to the command handlers.

use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CalcArgs, CatalogArgs, Cli, Command, SampleArgs};
use crate::data::{CatalogLoader, CatalogSpec, SampleConfig, generate_sample};
use crate::domain::LoadState;
use crate::error::AppError;
use crate::io::{cards_to_json, read_cards, write_cards};
use crate::observe::CardObserver;
use crate::report::format_view;
use crate::session::{RenderState, build_view};

pub mod watch;

/// Entry point for the `tradeup` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs stay off unless RUST_LOG asks.
    let default_filter = match &cli.command {
        Command::Watch(args) if !args.plain => "off",
        _ => "warn",
    };
    init_tracing(default_filter);

    match cli.command {
        Command::Calc(args) => handle_calc(args),
        Command::Watch(args) => build_runtime()?.block_on(watch::run(&args)),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_runtime() -> Result<Runtime, AppError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to start runtime: {e}")))
}

/// Resolve the catalog source and load it to completion.
async fn load_catalog(args: &CatalogArgs) -> Result<Arc<CatalogLoader>, AppError> {
    let source = CatalogSpec::resolve(args.catalog.as_deref()).into_source(args.fetch_timeout())?;
    info!(source = %source.describe(), "loading catalog");
    let loader = Arc::new(CatalogLoader::new(source));
    if loader.load_and_wait().await == LoadState::Failed {
        let err = loader.store().last_error();
        return Err(match err {
            Some(err) => err.into(),
            None => AppError::new(4, "Failed to load skins database"),
        });
    }
    Ok(loader)
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    // Bad card files are reported before any network traffic.
    let cards = read_cards(&args.cards)?;
    let loader = build_runtime()?.block_on(load_catalog(&args.catalog))?;

    let view = build_view(loader.store(), &CardObserver::default(), || Ok(cards));
    print!("{}", format_view(&view));
    match view.state {
        RenderState::Error(message) => Err(AppError::new(4, message)),
        _ => Ok(()),
    }
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let loader = build_runtime()?.block_on(load_catalog(&args.catalog))?;
    let catalog = loader.store().all();

    let config = SampleConfig {
        rarity: args.rarity,
        collection: args.collection.clone(),
        count: args.count,
        seed: args.seed,
    };
    let cards = generate_sample(&catalog, &config)?;

    match &args.out {
        Some(path) => {
            write_cards(path, &cards)?;
            info!(count = cards.len(), path = %path.display(), "wrote sample card file");
        }
        None => println!("{}", cards_to_json(&cards)?),
    }
    Ok(())
}

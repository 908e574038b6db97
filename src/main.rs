//! # NewsByte
//!
//! A terminal news assistant. It asks for a category and a region, fetches
//! the latest headlines from a GNews-compatible endpoint and shows them as
//! chat messages, then offers another search.
//!
//! ## Features
//!
//! - Scripted conversation: category → region → results → search again
//! - Direct GNews access or any proxy that speaks the same query string
//! - Built-in headlines per category whenever live news is unavailable
//! - A usage counter that survives restarts
//!
//! ## Usage
//!
//! ```sh
//! GNEWS_API_KEY=... newsbyte
//! newsbyte --endpoint http://localhost:3000/api/news --no-delay
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags over an optional YAML file
//! 2. **Usage**: Load the persisted count
//! 3. **Conversation**: The controller drives the script and calls the
//!    news provider once both choices are known
//! 4. **Output**: Results are rendered to markdown and printed to the terminal

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod conversation;
mod fallback;
mod models;
mod outputs;
mod usage;
mod utils;

use api::{HttpNewsSource, NewsProvider};
use cli::Cli;
use config::Settings;
use conversation::Controller;
use usage::{FileUsageStore, MemoryUsageStore, UsageCounter, UsageStore};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs share the terminal with the chat, so keep them quiet by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsbyte starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.endpoint, "Parsed CLI arguments");

    let settings = Settings::from_cli(&args)?;
    let endpoint = settings.endpoint_url()?;
    info!(
        endpoint = %endpoint,
        has_api_key = settings.api_key.is_some(),
        max_results = settings.max_results,
        "Loaded settings"
    );

    let store = usage_store(&settings);
    let counter = UsageCounter::load(store);
    info!(uses = counter.count(), "Usage count loaded");

    let source = HttpNewsSource::new(endpoint, settings.api_key.clone());
    let provider = NewsProvider::new(source, counter)
        .with_max_results(settings.max_results)
        .with_lang(settings.lang.clone());
    let mut controller = Controller::new(provider, settings.pacing());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    outputs::terminal::run(&mut controller, stdin, &mut stdout).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        uses = controller.usage_count(),
        messages = controller.transcript().messages().len(),
        "Session complete"
    );
    Ok(())
}

/// Pick where the usage count lives for this run.
fn usage_store(settings: &Settings) -> Box<dyn UsageStore> {
    if settings.ephemeral {
        return Box::new(MemoryUsageStore::new());
    }
    match settings
        .usage_file
        .clone()
        .or_else(FileUsageStore::default_path)
    {
        Some(path) => {
            let store = FileUsageStore::new(path);
            debug!(path = %store.path().display(), "Using file usage store");
            Box::new(store)
        }
        None => {
            warn!("No data directory available; usage count will not persist");
            Box::new(MemoryUsageStore::new())
        }
    }
}

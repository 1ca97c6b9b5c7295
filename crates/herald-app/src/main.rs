//! Herald application binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Build the project whitelist and document fetcher
//! 3. Construct the dispatcher with the built-in handlers
//! 4. Start the background confirmation sweeper
//! 5. Serve JSON-lines requests from stdin until EOF or Ctrl-C

mod cli;
mod protocol;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use herald_action::{
    CachedResolver, ConfirmationSweeper, Dispatcher, FsDocumentFetcher, StaticProjectRegistry,
};
use herald_core::config::HeraldConfig;

use crate::cli::{expand_home, CliArgs};

/// How long a resolved project stays cached.
const RESOLVER_CACHE_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = HeraldConfig::load_or_default(&config_file);

    // Tracing. Stdout carries responses, so logs go to stderr.
    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Herald v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_file.display(),
        projects = config.projects.len(),
        "Configuration loaded"
    );

    // Collaborators.
    let resolver = CachedResolver::new(
        StaticProjectRegistry::new(config.projects.clone()),
        RESOLVER_CACHE_SECS,
    );
    let docs_root = expand_home(&config.documents.root);
    tracing::info!(root = %docs_root.display(), "Document root");
    let fetcher = FsDocumentFetcher::new(docs_root);

    let dispatcher = Arc::new(Dispatcher::with_defaults(
        &config,
        Arc::new(resolver),
        Arc::new(fetcher),
    )?);
    tracing::info!(actions = ?dispatcher.available_actions(), "Dispatcher ready");

    // === Background tasks ===

    let sweeper = Arc::new(ConfirmationSweeper::new(
        Arc::clone(&dispatcher),
        Duration::from_secs(config.confirmation.sweep_interval_secs.max(1)),
    ));
    let sweeper_task = tokio::spawn({
        let sweeper = Arc::clone(&sweeper);
        async move { sweeper.run().await }
    });

    // === Request loop ===

    let reader = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = protocol::serve(&dispatcher, reader, tokio::io::stdout()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Request loop failed");
            }
        }
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    sweeper.shutdown();
    if let Err(e) = sweeper_task.await {
        tracing::warn!(error = %e, "Confirmation sweeper ended abnormally");
    }
    tracing::info!(pending = dispatcher.pending_count(), "Herald stopped");

    Ok(())
}

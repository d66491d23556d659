//! Terminal client: read the feed of the accounts you follow and write notes.

mod app;
mod config;
mod prompt;
mod render;

use anyhow::{Context, bail};
use app::App;
use clap::Parser;
use colored::Colorize;
use config::{Args, Settings};
use nostr_client::{PoolConfig, RelayPool};
use nostr_feed::{Composer, FeedSession};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    if let Err(e) = run(&args).await {
        eprintln!("{} {e:#}", "error:".red().bold());
    }
    // Quitting is reported with status 1 too.
    ExitCode::from(1)
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let settings = Settings::load(args).context("invalid configuration")?;

    let composer = settings
        .secret_key
        .map(Composer::new)
        .transpose()
        .context("NSEC cannot sign notes")?;

    let pool = RelayPool::new(settings.relays.clone(), PoolConfig::default());
    pool.connect().await;
    let connected = pool.connected_relays().await;
    if connected.is_empty() {
        bail!("could not reach any of {}", settings.relays.join(", "));
    }
    info!(relays = %connected.join(", "), "relay pool ready");

    let session = FeedSession::new(&pool, settings.owner.clone(), settings.feed.clone());
    let mut app = App::new(&pool, session, composer, settings.owner_npub.clone());
    let outcome = app.run().await;

    pool.disconnect_all().await;
    outcome
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

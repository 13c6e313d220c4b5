//! `hn-digest` - poll Hacker News and deliver a filtered digest.

use anyhow::{Context, Result};
use clap::Parser;
use digest_core::{AppConfig, Namespace, NewsSource, SeenStore};
use digest_db::SqlStore;
use digest_notify::Dispatcher;
use digest_pipeline::{run_vacuum, DigestPipeline};
use digest_source::HackerNewsClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hn-digest", version)]
#[command(about = "Fetch new Hacker News stories, filter them and send a digest")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report stories that match none of the filters
    #[arg(short, long)]
    reverse: bool,

    /// Only purge old records from the database, then exit
    #[arg(short, long)]
    vacuum: bool,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hn_digest=debug"));

    // stdout is reserved for the console digest
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    info!("Starting hn-digest v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let namespace = Namespace::for_run(args.reverse || config.reverse_filters);

    let store = Arc::new(
        SqlStore::connect(&config.database, config.purge_after_days)
            .context("failed to open database")?,
    );

    if args.vacuum {
        println!(
            "Removing records older than {} days",
            config.purge_after_days
        );
        run_vacuum(store.as_ref(), namespace)
            .await
            .context("maintenance failed")?;
        return Ok(());
    }

    let source = HackerNewsClient::with_url(&config.api_base_url, config.request_timeout_secs)
        .context("failed to create API client")?;
    let dispatcher =
        Dispatcher::from_config(&config).context("failed to set up notification channel")?;

    let outcome = DigestPipeline::from_config(
        &config,
        args.reverse,
        Arc::new(source) as Arc<dyn NewsSource>,
        store as Arc<dyn SeenStore>,
        dispatcher,
    )
    .run()
    .await
    .context("digest run failed")?;

    println!("Filters: {}", outcome.filter_count);
    println!("Fetched new items: {}", outcome.matched_count);

    Ok(())
}

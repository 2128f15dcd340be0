//! # Tidewatch
//!
//! Schedule notification daemon. Watches a rotation feed, evaluates
//! subscriber conditions and delivers Discord alerts.
//!
//! ```text
//! tidewatch serve              # run the checker loop and command gateway
//! tidewatch check              # run a single check cycle and exit
//! tidewatch config show       # print the effective configuration
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tidewatch_channels::discord::{DiscordChannel, DiscordChannelConfig};
use tidewatch_core::config::TidewatchConfig;
use tidewatch_core::traits::store::SubscriptionStore;
use tidewatch_engine::checker::CheckRunner;
use tidewatch_engine::runner::spawn_periodic;
use tidewatch_feed::cache::SnapshotCache;
use tidewatch_feed::client::ScheduleClient;
use tidewatch_gateway::server::AppState;

#[derive(Parser)]
#[command(name = "tidewatch", version, about = "Schedule notification daemon")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic checker and the command gateway
    Serve,
    /// Run a single check cycle and exit
    Check,
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = TidewatchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Check => check_once(config).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            println!("{}", toml::to_string_pretty(&config.sanitized())?);
            Ok(())
        }
    }
}

fn build_runner(
    config: &TidewatchConfig,
) -> anyhow::Result<(Arc<CheckRunner>, Arc<dyn SubscriptionStore>)> {
    let bot_token = config.require_bot_token()?.to_string();

    let source = Arc::new(SnapshotCache::new(
        ScheduleClient::new(config.feed.url.clone()),
        config.feed.cache_minutes,
    ));
    let store = tidewatch_store::create_store(&config.store, config.store_path())?;
    let channel = Arc::new(DiscordChannel::new(DiscordChannelConfig { bot_token }));

    let runner = Arc::new(CheckRunner::new(source, store.clone(), channel));
    Ok((runner, store))
}

async fn serve(config: TidewatchConfig) -> anyhow::Result<()> {
    let (runner, store) = build_runner(&config)?;

    let checker = spawn_periodic(runner.clone(), config.checker.interval_minutes);
    tracing::info!(
        interval_minutes = config.checker.interval_minutes,
        "checker loop started"
    );

    let state = AppState {
        store,
        runner,
        config: config.gateway.clone(),
        start_time: Instant::now(),
    };
    tidewatch_gateway::server::serve(Arc::new(state)).await?;

    checker.abort();
    Ok(())
}

async fn check_once(config: TidewatchConfig) -> anyhow::Result<()> {
    let (runner, _store) = build_runner(&config)?;
    let report = runner.run_cycle().await;
    println!(
        "checked {} subscriber(s): {} sent, {} error(s)",
        report.subscribers, report.sent, report.errors
    );
    Ok(())
}

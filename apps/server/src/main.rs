//! Trustpool Bot - Telegram reporter and alerter
//!
//! Serves on-demand mining reports and pushes offline and payout alerts.

mod config;

use clap::Parser;
use config::Settings;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use trustpool_alerts::{Database, MessageSink, Notifier, NotifierConfig, TelegramBot};
use trustpool_engine::{ReportConfig, Reporter};
use trustpool_feeds::{CoinGeckoClient, PoolClient, PoolClientConfig};

/// Trustpool Bot CLI
#[derive(Parser, Debug)]
#[command(name = "trustpool-bot")]
#[command(about = "Telegram bot for Trustpool mining reports and alerts", long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// SQLite database URL for bot state
    #[arg(short, long, default_value = "sqlite://state.db")]
    database: String,

    /// Seconds between alert checks
    #[arg(long, default_value_t = 120)]
    poll_interval: u64,

    /// Seconds before the first alert check
    #[arg(long, default_value_t = 10)]
    first_poll_delay: u64,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Trustpool Bot starting...");
    info!("  Coins: {:?}", settings.coins);
    info!("  Fiat: {}", settings.fiat);
    info!("  Alert chats: {}", settings.chat_ids.len());
    info!("  Offline threshold: {} min", settings.offline_threshold_min);
    info!("  Only offline alerts: {}", settings.only_offline_alerts);
    info!(
        "  Worker aliases: {} scoped, {} global",
        settings.aliases.scoped_len(),
        settings.aliases.global_len()
    );

    let db = match Database::connect(&args.database).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {}", args.database, e);
            std::process::exit(1);
        }
    };

    let pool = match PoolClient::new(PoolClientConfig::from(&settings), settings.aliases.clone()) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            error!("Failed to create pool client: {}", e);
            std::process::exit(1);
        }
    };

    let prices = match CoinGeckoClient::new() {
        Ok(prices) => Arc::new(prices),
        Err(e) => {
            error!("Failed to create price client: {}", e);
            std::process::exit(1);
        }
    };

    let reporter = Arc::new(Reporter::new(
        pool.clone(),
        prices,
        ReportConfig::from(&settings),
    ));
    let bot = Arc::new(TelegramBot::new(&settings.telegram_token, reporter));

    let notifier = Arc::new(Notifier::new(
        pool,
        Arc::new(db),
        NotifierConfig::from(&settings),
    ));
    let sink: Arc<dyn MessageSink> = bot.clone();
    let interval = Duration::from_secs(args.poll_interval.max(1));
    let first_delay = Duration::from_secs(args.first_poll_delay);
    let alert_handle = tokio::spawn(async move {
        notifier.run(sink, interval, first_delay).await;
    });

    // Runs until Ctrl+C
    bot.run().await;

    alert_handle.abort();
    info!("👋 Trustpool Bot stopped");
}

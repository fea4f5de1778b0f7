use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use stock_watch::monitor::{AlertState, NotifyPolicy, StockMonitor};
use stock_watch::plugins::select_notifier;
use stock_watch::plugins::traits::FetchStrategy;
use stock_watch::scheduler::{run_monitor, IntervalTicker};
use stock_watch::scraper::build_source;
use stock_watch::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "stock-watch",
    version,
    about = "Watches a product page for sizes coming back in stock"
)]
struct Args {
    /// Run a single check and exit
    #[arg(long)]
    test: bool,

    /// Print the resolved configuration (secrets masked) before running
    #[arg(short, long)]
    verbose: bool,

    /// How to fetch product pages
    #[arg(long, value_enum)]
    fetch: Option<FetchStrategy>,

    /// Whether to email once per process or on every pass while in stock
    #[arg(long, value_enum)]
    notify: Option<NotifyPolicy>,

    /// Seconds between checks
    #[arg(long)]
    interval: Option<u64>,

    /// Config file (TOML); defaults to config/stock-watch.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // Initialize tracing
    let level = if args.test || args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("stock_watch={}", level).parse()?),
        )
        .with_target(false)
        .init();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(fetch) = args.fetch {
        config.monitor.fetch_strategy = fetch;
    }
    if let Some(notify) = args.notify {
        config.monitor.notify_policy = notify;
    }
    if let Some(interval) = args.interval {
        config.monitor.interval_secs = interval;
    }
    config.validate()?;

    if args.verbose {
        info!("Resolved configuration:");
        for line in config.redacted().lines() {
            info!("  {}", line);
        }
    }

    let source = build_source(config.monitor.fetch_strategy, &config.scraper)?;
    let notifier = select_notifier(&config.notifications, &config.credentials)?;
    info!(
        "Using {} fetching, {} delivery, notify policy {}",
        source.strategy(),
        notifier.transport(),
        config.monitor.notify_policy
    );

    let monitor = StockMonitor::new(
        source,
        notifier,
        config.targets.clone(),
        config.monitor.notify_policy,
    )
    .with_subject(config.notifications.subject());
    let mut state = AlertState::default();

    if args.test {
        info!("🧪 TEST MODE - checking once and exiting...");
        monitor.run_pass(&mut state).await;
        return Ok(());
    }

    info!(
        "▶️  Starting continuous checker for {} region(s) (runs every {} minutes)",
        monitor.regions().len(),
        config.monitor.interval_secs / 60
    );
    let mut ticker = IntervalTicker::new(Duration::from_secs(config.monitor.interval_secs));

    tokio::select! {
        _ = run_monitor(&monitor, &mut state, &mut ticker) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down...");
        }
    }

    Ok(())
}

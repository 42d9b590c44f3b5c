//! Run command
//!
//! Loads the config and order file, starts the engine against the simulated
//! feed and the paper venue, then runs until Ctrl+C (or the `--run-for`
//! deadline) before stopping the worker and printing a summary.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use limit_order_engine::data::load_orders;
use limit_order_engine::{Config, EngineConfig, OrderProcessingEngine, PaperVenue};

pub fn run(
    config_path: String,
    orders_path: String,
    interval_ms: Option<u64>,
    run_for: Option<u64>,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, orders_path, interval_ms, run_for))
}

async fn run_async(
    config_path: String,
    orders_path: String,
    interval_ms: Option<u64>,
    run_for: Option<u64>,
) -> Result<()> {
    let config = Config::from_file(&config_path)
        .context(format!("Failed to load config from {}", config_path))?;
    config.validate()?;

    let mut engine_config =
        EngineConfig::default().with_poll_interval(config.engine.poll_interval());
    if let Some(ms) = interval_ms {
        engine_config = engine_config.with_poll_interval(Duration::from_millis(ms));
    }

    let orders = load_orders(&orders_path)
        .context(format!("Failed to load orders from {}", orders_path))?;

    info!("Limit order engine starting");
    info!(
        "Feed: uniform {:.2}..{:.2}{}",
        config.feed.min_price,
        config.feed.max_price,
        match config.feed.seed {
            Some(seed) => format!(" (seed {})", seed),
            None => String::new(),
        }
    );
    info!("Poll interval: {:?}", engine_config.poll_interval);
    info!("Orders: {} from {}", orders.len(), orders_path);

    let feed = Arc::new(config.feed.build());
    let venue = Arc::new(PaperVenue::new());
    let engine = OrderProcessingEngine::new(feed, venue.clone(), engine_config);

    for order in orders {
        engine.submit(order);
    }

    engine.start();

    match run_for {
        Some(secs) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, initiating shutdown...");
                }
                _ = sleep(Duration::from_secs(secs)) => {
                    info!("Run deadline of {}s reached, shutting down", secs);
                }
            }
        }
        None => match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating shutdown..."),
            Err(e) => error!("Error setting up signal handler: {}", e),
        },
    }

    engine.stop();

    let stats = engine.stats();
    info!("Run complete");
    info!("Evaluations: {}", stats.evaluations);
    info!("Executions: {}", stats.executions);
    info!("Failed executions: {}", stats.failed_executions);
    for fill in venue.fills() {
        info!(
            "Filled: {} {} qty={}",
            fill.side, fill.product_id, fill.quantity
        );
    }
    info!("Orders still queued: {}", engine.queue_len());

    Ok(())
}

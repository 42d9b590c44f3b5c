//! Check command
//!
//! Validates a configuration and order file without starting the engine, and
//! summarizes the batch per product. Warns about orders whose limit can
//! never be met within the configured feed range.

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::{info, warn};

use limit_order_engine::data::load_orders;
use limit_order_engine::{Config, Price, Side};

pub fn run(config_path: String, orders_path: String) -> Result<()> {
    let config = Config::from_file(&config_path)
        .context(format!("Failed to load config from {}", config_path))?;
    config.validate().context("Invalid configuration")?;
    info!(
        "Config OK: poll={}ms feed={:.2}..{:.2}",
        config.engine.poll_interval_ms, config.feed.min_price, config.feed.max_price
    );

    let orders = load_orders(&orders_path)
        .context(format!("Failed to load orders from {}", orders_path))?;

    let by_product = orders
        .iter()
        .into_group_map_by(|order| order.product_id().clone());

    for (product, group) in by_product
        .iter()
        .sorted_by_key(|(product, _)| product.as_str().to_string())
    {
        let buys = group.iter().filter(|o| o.side() == Side::Buy).count();
        let sells = group.len() - buys;
        info!(
            "{}: {} orders ({} buy / {} sell)",
            product,
            group.len(),
            buys,
            sells
        );
    }

    // An order is stuck forever if no tick in the feed range can satisfy it,
    // and it blocks everything queued behind it
    let feed_min = Price::from_f64(config.feed.min_price);
    let feed_max = Price::from_f64(config.feed.max_price);
    for order in &orders {
        let reachable = match order.side() {
            Side::Buy => feed_min <= order.limit_price(),
            Side::Sell => feed_max >= order.limit_price(),
        };
        if !reachable {
            warn!(
                "{} {} limit {} can never execute with feed {:.2}..{:.2}",
                order.side(),
                order.product_id(),
                order.limit_price(),
                config.feed.min_price,
                config.feed.max_price
            );
        }
    }

    info!("All {} orders valid", orders.len());
    Ok(())
}

//! Limit order engine - main entry point
//!
//! This binary provides two subcommands:
//! - run: Process a batch of limit orders against the simulated price feed
//! - check: Validate a configuration and order file without running

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "limit-order-engine")]
#[command(about = "Asynchronous limit order processing engine with a simulated price feed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the order processing engine
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/demo.json")]
        config: String,

        /// Path to CSV order file
        #[arg(short, long, default_value = "data/orders.csv")]
        orders: String,

        /// Poll interval in milliseconds (overrides config file)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop automatically after this many seconds (default: run until Ctrl+C)
        #[arg(long)]
        run_for: Option<u64>,
    },

    /// Validate a configuration and order file without running the engine
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/demo.json")]
        config: String,

        /// Path to CSV order file
        #[arg(short, long, default_value = "data/orders.csv")]
        orders: String,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // File appender
    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    // Initialize subscriber with both console and file
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Run { .. } => "run",
        Commands::Check { .. } => "check",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Run {
            config,
            orders,
            interval_ms,
            run_for,
        } => commands::run::run(config, orders, interval_ms, run_for),

        Commands::Check { config, orders } => commands::check::run(config, orders),
    }
}

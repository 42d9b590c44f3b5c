//! Limit Order Engine
//!
//! An asynchronous limit-order processor: orders rest in a FIFO queue and a
//! single background worker executes each one once a polled market price
//! satisfies its limit condition. The price feed and the execution venue sit
//! behind narrow traits, with a simulated feed and a paper venue bundled for
//! demo runs.

pub mod config;
pub mod data;
pub mod engine;
pub mod execution;
pub mod feed;
pub mod queue;
pub mod types;

pub use config::Config;
pub use engine::{EngineConfig, EngineStats, OrderProcessingEngine};
pub use execution::{ExecutionError, ExecutionVenue, PaperFill, PaperVenue};
pub use feed::{PriceSource, SimulatedFeed};
pub use queue::OrderQueue;
pub use types::*;

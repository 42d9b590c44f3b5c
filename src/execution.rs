//! Execution venues
//!
//! The engine hands matched orders to an [`ExecutionVenue`]. Venue calls are
//! synchronous and may fail; a failure leaves the order at the head of the
//! queue for the next cycle.

use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::types::{ProductId, Side};

/// Errors surfaced by an execution venue
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("execution failed: {0}")]
    Failed(String),
}

/// Target for order execution.
///
/// `Ok(())` means the full quantity executed; there are no partial fills at
/// this boundary. Calls block until the venue answers.
pub trait ExecutionVenue: Send + Sync {
    fn buy(&self, product_id: &ProductId, quantity: u32) -> Result<(), ExecutionError>;

    fn sell(&self, product_id: &ProductId, quantity: u32) -> Result<(), ExecutionError>;
}

/// A recorded paper execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFill {
    pub side: Side,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Venue that always fills and keeps a record of every execution.
///
/// Used by the demo runner and as the recording double in tests. No real
/// money moves; each fill is logged with the `[PAPER]` tag.
#[derive(Debug, Default)]
pub struct PaperVenue {
    fills: Mutex<Vec<PaperFill>>,
}

impl PaperVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all fills so far, in execution order
    pub fn fills(&self) -> Vec<PaperFill> {
        self.fills.lock().expect("paper fills lock poisoned").clone()
    }

    fn record(&self, side: Side, product_id: &ProductId, quantity: u32) {
        info!("[PAPER] {} {} qty={}", side, product_id, quantity);
        let mut fills = self.fills.lock().expect("paper fills lock poisoned");
        fills.push(PaperFill {
            side,
            product_id: product_id.clone(),
            quantity,
        });
    }
}

impl ExecutionVenue for PaperVenue {
    fn buy(&self, product_id: &ProductId, quantity: u32) -> Result<(), ExecutionError> {
        self.record(Side::Buy, product_id, quantity);
        Ok(())
    }

    fn sell(&self, product_id: &ProductId, quantity: u32) -> Result<(), ExecutionError> {
        self.record(Side::Sell, product_id, quantity);
        Ok(())
    }
}

//! Price sources
//!
//! The engine polls a [`PriceSource`] once per cycle for the product at the
//! head of the queue. The bundled [`SimulatedFeed`] draws uniform random
//! prices; a real market-data client would implement the same trait.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Price, ProductId};

// =============================================================================
// Constants
// =============================================================================

/// Default lower bound of the simulated price range
pub const DEFAULT_MIN_PRICE: f64 = 1.0;

/// Default upper bound of the simulated price range
pub const DEFAULT_MAX_PRICE: f64 = 200.0;

// =============================================================================
// PriceSource
// =============================================================================

/// Source of current market prices.
///
/// `price_tick` is a pure read: it must not touch order state and may be
/// called arbitrarily often. Implementations always return a price; there is
/// no error path at this boundary. No monotonicity or statistical behavior
/// is assumed by the engine.
pub trait PriceSource: Send + Sync {
    /// Current price for the given product. Always positive.
    fn price_tick(&self, product_id: &ProductId) -> Price;
}

// =============================================================================
// SimulatedFeed
// =============================================================================

/// Uniform random price feed over `[min_price, max_price]`.
///
/// Every tick draws independently from the range regardless of the product
/// id; the simulation runs one stream for all products. Seed it for
/// reproducible runs.
pub struct SimulatedFeed {
    rng: Mutex<StdRng>,
    min_price: f64,
    max_price: f64,
}

impl SimulatedFeed {
    /// Create a feed over the given range, seeded from OS entropy.
    /// Expects `0 < min_price <= max_price`.
    pub fn new(min_price: f64, max_price: f64) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            min_price,
            max_price,
        }
    }

    /// Create a feed with a fixed seed for reproducible price sequences
    pub fn with_seed(min_price: f64, max_price: f64, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            min_price,
            max_price,
        }
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE)
    }
}

impl PriceSource for SimulatedFeed {
    fn price_tick(&self, _product_id: &ProductId) -> Price {
        let mut rng = self.rng.lock().expect("price rng lock poisoned");
        Price::from_f64(rng.gen_range(self.min_price..=self.max_price))
    }
}

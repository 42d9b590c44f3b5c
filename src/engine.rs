//! Order processing engine
//!
//! A single background worker drains a FIFO queue of limit orders. Each
//! cycle it peeks at the head order, fetches a fresh price for that product,
//! and executes through the venue when the limit condition is met. The queue
//! lock is held across the whole cycle (price fetch, limit check, venue
//! call), so submissions wait behind an in-flight execution attempt; one
//! mutex serializes everything and throughput is capped at one evaluation
//! per poll interval.
//!
//! Orders are evaluated strictly in arrival order. A head order whose limit
//! is never met blocks everything behind it indefinitely, and a failed
//! execution leaves the order at the head to be retried on later cycles.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::execution::{ExecutionError, ExecutionVenue};
use crate::feed::PriceSource;
use crate::queue::OrderQueue;
use crate::types::{Order, Side};

/// Default pause between evaluation cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the order processing engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed pause between evaluation cycles, slept outside the queue lock
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with a custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Counter snapshot returned by [`OrderProcessingEngine::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Head-order checks against a fetched price
    pub evaluations: u64,
    /// Orders executed and removed from the queue
    pub executions: u64,
    /// Venue calls that returned an error (the order stayed queued)
    pub failed_executions: u64,
}

#[derive(Debug, Default)]
struct StatsCells {
    evaluations: AtomicU64,
    executions: AtomicU64,
    failed_executions: AtomicU64,
}

impl StatsCells {
    fn snapshot(&self) -> EngineStats {
        EngineStats {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
            failed_executions: self.failed_executions.load(Ordering::Relaxed),
        }
    }
}

/// Asynchronous limit order processor.
///
/// Owns the pending-order queue and drives it with one dedicated worker
/// thread between [`start`](Self::start) and [`stop`](Self::stop). The price
/// source and execution venue are collaborators behind trait objects. All
/// methods take `&self`, so an `Arc<OrderProcessingEngine>` can be shared
/// between submitters and a controller.
pub struct OrderProcessingEngine {
    queue: Arc<Mutex<OrderQueue>>,
    feed: Arc<dyn PriceSource>,
    venue: Arc<dyn ExecutionVenue>,
    config: EngineConfig,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<StatsCells>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl OrderProcessingEngine {
    /// Create a stopped engine over an empty queue
    pub fn new(
        feed: Arc<dyn PriceSource>,
        venue: Arc<dyn ExecutionVenue>,
        config: EngineConfig,
    ) -> Self {
        Self {
            queue: Arc::new(Mutex::new(OrderQueue::new())),
            feed,
            venue,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(StatsCells::default()),
            worker: Mutex::new(None),
        }
    }

    /// Queue an order for processing. Always succeeds.
    ///
    /// The worker sees the order once the in-flight cycle releases the queue
    /// lock; orders submitted while running are picked up without a restart.
    pub fn submit(&self, order: Order) {
        let mut queue = self.queue.lock().expect("order queue lock poisoned");
        debug!(
            "queued {} {} qty={} limit={}",
            order.side(),
            order.product_id(),
            order.quantity(),
            order.limit_price()
        );
        queue.push_back(order);
    }

    /// Start the background worker.
    ///
    /// # Panics
    ///
    /// Panics if the engine is already running. Restarting after
    /// [`stop`](Self::stop) is allowed and resumes over the same queue.
    pub fn start(&self) {
        let mut slot = self.worker_handle();
        assert!(slot.is_none(), "engine already started");

        self.stop_flag.store(false, Ordering::SeqCst);

        let worker = Worker {
            queue: Arc::clone(&self.queue),
            feed: Arc::clone(&self.feed),
            venue: Arc::clone(&self.venue),
            stop_flag: Arc::clone(&self.stop_flag),
            stats: Arc::clone(&self.stats),
            poll_interval: self.config.poll_interval,
        };

        let handle = thread::Builder::new()
            .name("order-worker".to_string())
            .spawn(move || worker.run())
            .expect("failed to spawn order worker");
        *slot = Some(handle);

        info!(
            "engine started (poll interval {:?})",
            self.config.poll_interval
        );
    }

    /// Signal the worker to stop and wait for it to exit.
    ///
    /// The stop flag is checked once per cycle, never mid-cycle, so this can
    /// block for up to one poll interval plus the in-flight cycle. Once it
    /// returns there is no background activity; unexecuted orders stay
    /// queued. Calling `stop` on an engine that is not running is a no-op.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(handle) = self.worker_handle().take() {
            if handle.join().is_err() {
                error!("order worker panicked before shutdown");
            }
            info!("engine stopped");
        }
    }

    /// Whether `start` has been called without a matching `stop`
    pub fn is_running(&self) -> bool {
        self.worker_handle().is_some()
    }

    /// Number of orders currently queued
    pub fn queue_len(&self) -> usize {
        self.queue.lock().expect("order queue lock poisoned").len()
    }

    /// Snapshot of the engine counters
    pub fn stats(&self) -> EngineStats {
        self.stats.snapshot()
    }

    // shutdown must still be able to join if a panic poisoned the handle lock
    fn worker_handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for OrderProcessingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State owned by the worker thread
struct Worker {
    queue: Arc<Mutex<OrderQueue>>,
    feed: Arc<dyn PriceSource>,
    venue: Arc<dyn ExecutionVenue>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<StatsCells>,
    poll_interval: Duration,
}

impl Worker {
    fn run(self) {
        debug!("order worker running");

        while !self.stop_flag.load(Ordering::SeqCst) {
            if let Err(e) = self.run_cycle() {
                error!("order cycle error: {}", e);
            }

            thread::sleep(self.poll_interval);
        }

        debug!("order worker exiting");
    }

    /// One evaluation cycle. The queue lock is held for the full cycle.
    fn run_cycle(&self) -> Result<(), ExecutionError> {
        let mut queue = self.queue.lock().expect("order queue lock poisoned");

        // An empty queue is a normal state, not an error
        let order = match queue.front() {
            Some(order) => order.clone(),
            None => return Ok(()),
        };

        let price = self.feed.price_tick(order.product_id());
        self.stats.evaluations.fetch_add(1, Ordering::Relaxed);
        debug!("price tick {} = {}", order.product_id(), price);

        if !order.is_marketable_at(price) {
            debug!(
                "{} {} limit {} not met at {}",
                order.side(),
                order.product_id(),
                order.limit_price(),
                price
            );
            return Ok(());
        }

        let result = match order.side() {
            Side::Buy => self.venue.buy(order.product_id(), order.quantity()),
            Side::Sell => self.venue.sell(order.product_id(), order.quantity()),
        };

        match result {
            Ok(()) => {
                queue.pop_front();
                self.stats.executions.fetch_add(1, Ordering::Relaxed);
                info!(
                    "executed {} {} qty={} limit={} at {}",
                    order.side(),
                    order.product_id(),
                    order.quantity(),
                    order.limit_price(),
                    price
                );
                Ok(())
            }
            Err(e) => {
                // Order stays at the head for the next cycle
                self.stats.failed_executions.fetch_add(1, Ordering::Relaxed);
                error!(
                    "execution failed for {} {} qty={}: {}",
                    order.side(),
                    order.product_id(),
                    order.quantity(),
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::PaperVenue;
    use crate::types::{Price, ProductId};
    use std::time::Instant;

    struct FixedFeed(Price);

    impl PriceSource for FixedFeed {
        fn price_tick(&self, _product_id: &ProductId) -> Price {
            self.0
        }
    }

    fn fast_config() -> EngineConfig {
        EngineConfig::default().with_poll_interval(Duration::from_millis(10))
    }

    fn buy(product: &str, quantity: u32, limit: f64) -> Order {
        Order::new(
            Side::Buy,
            ProductId::new(product),
            quantity,
            Price::from_f64(limit),
        )
        .unwrap()
    }

    fn wait_for(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_submit_queues_without_worker() {
        let engine = OrderProcessingEngine::new(
            Arc::new(FixedFeed(Price::from_f64(100.0))),
            Arc::new(PaperVenue::new()),
            fast_config(),
        );

        engine.submit(buy("123", 1000, 100.0));
        engine.submit(buy("456", 1, 50.0));

        assert_eq!(engine.queue_len(), 2);
        assert_eq!(engine.stats(), EngineStats::default());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let engine = OrderProcessingEngine::new(
            Arc::new(FixedFeed(Price::from_f64(100.0))),
            Arc::new(PaperVenue::new()),
            fast_config(),
        );

        assert!(!engine.is_running());
        engine.start();
        assert!(engine.is_running());

        engine.stop();
        assert!(!engine.is_running());

        // stop when already stopped is a no-op
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    #[should_panic(expected = "engine already started")]
    fn test_double_start_panics() {
        let engine = OrderProcessingEngine::new(
            Arc::new(FixedFeed(Price::from_f64(100.0))),
            Arc::new(PaperVenue::new()),
            fast_config(),
        );

        engine.start();
        engine.start();
    }

    #[test]
    fn test_restart_after_stop_resumes_queue() {
        let engine = OrderProcessingEngine::new(
            // Feed never satisfies the limit, the order survives the first run
            Arc::new(FixedFeed(Price::from_f64(150.0))),
            Arc::new(PaperVenue::new()),
            fast_config(),
        );

        engine.submit(buy("123", 1000, 100.0));
        engine.start();
        assert!(wait_for(|| engine.stats().evaluations >= 1));
        engine.stop();

        assert_eq!(engine.queue_len(), 1);
        engine.start();
        assert!(wait_for(|| engine.stats().evaluations >= 2));
        engine.stop();
    }

    #[test]
    fn test_executes_matching_buy_and_empties_queue() {
        let venue = Arc::new(PaperVenue::new());
        let engine = OrderProcessingEngine::new(
            Arc::new(FixedFeed(Price::from_f64(100.0))),
            venue.clone(),
            fast_config(),
        );

        engine.submit(buy("123", 1000, 100.0));
        engine.start();

        assert!(wait_for(|| engine.stats().executions == 1));
        assert!(wait_for(|| engine.queue_len() == 0));
        engine.stop();

        let fills = venue.fills();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].side, Side::Buy);
        assert_eq!(fills[0].product_id.as_str(), "123");
        assert_eq!(fills[0].quantity, 1000);
    }

    #[test]
    fn test_drop_joins_worker() {
        let engine = OrderProcessingEngine::new(
            Arc::new(FixedFeed(Price::from_f64(100.0))),
            Arc::new(PaperVenue::new()),
            fast_config(),
        );
        engine.start();
        drop(engine);
        // Reaching this point means drop joined rather than leaking the thread
    }
}

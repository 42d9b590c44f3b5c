//! FIFO order queue
//!
//! Insertion order is processing order; duplicates are allowed. The queue is
//! not thread-safe on its own: the engine wraps it in a single mutex and all
//! access (submission and the worker's evaluation cycle) goes through that
//! lock.

use std::collections::VecDeque;

use crate::types::Order;

/// Pending orders, oldest first
#[derive(Debug, Default)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the tail. Always succeeds; there is no bound on
    /// queue depth.
    pub fn push_back(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    /// Peek at the head order without removing it
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Remove and return the head order
    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

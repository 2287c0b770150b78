//! FIFO queue of callers suspended on the in-flight renewal.

use crate::RenewalError;
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// Result of one renewal episode, delivered to every waiter.
pub type RenewalOutcome = Result<(), RenewalError>;

/// One suspended caller.
///
/// Settling consumes the waiter, so it is resolved or rejected exactly once.
#[derive(Debug)]
pub struct Waiter {
    ticket: u64,
    sender: oneshot::Sender<RenewalOutcome>,
}

impl Waiter {
    /// Create a waiter and the receiver its caller suspends on.
    pub fn new(ticket: u64) -> (Self, oneshot::Receiver<RenewalOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { ticket, sender }, receiver)
    }

    /// Enrollment ticket, increasing across the life of the coordinator.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Deliver the outcome. Returns false if the caller is no longer listening.
    pub fn settle(self, outcome: RenewalOutcome) -> bool {
        self.sender.send(outcome).is_ok()
    }
}

/// Waiters in enrollment order.
#[derive(Debug, Default)]
pub struct WaiterQueue {
    waiters: VecDeque<Waiter>,
}

impl WaiterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, waiter: Waiter) {
        self.waiters.push_back(waiter);
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Settle every waiter, oldest first, and leave the queue empty.
    ///
    /// Returns how many callers were still listening.
    pub fn drain_all(&mut self, outcome: &RenewalOutcome) -> usize {
        self.waiters
            .drain(..)
            .map(|waiter| waiter.settle(outcome.clone()))
            .filter(|delivered| *delivered)
            .count()
    }
}

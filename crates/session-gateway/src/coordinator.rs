//! Single-flight renewal coordinator.
//!
//! Owns the renewal FSM and the waiter queue. Every caller that observed an
//! expired session enrolls here; the first one of an episode starts the one
//! renewal call, everyone else queues behind it.
//!
//! ```text
//! caller A ─┐ enroll (Idle → Renewing, starts renewal)
//! caller B ─┼──────────────► [A, B, C] ◄── renewal task
//! caller C ─┘ enroll                            │
//!                                               ▼
//!                    Renewing → Idle, drain A, B, C in order
//! ```
//!
//! The lock is never held across an await: enrollment and completion are each
//! one synchronous critical section, and only the renewal call itself spans a
//! suspension point, with the state held at `Renewing` for its duration.

use crate::renewal_fsm::{RenewalMachine, RenewalMachineInput, RenewalState};
use crate::waiter_queue::{RenewalOutcome, Waiter, WaiterQueue};
use crate::RenewalError;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Counters for monitoring renewal behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Renewal calls started (one per episode)
    pub renewals_started: u64,
    /// Episodes that extended the session
    pub renewals_succeeded: u64,
    /// Episodes that failed
    pub renewals_failed: u64,
    /// Callers enrolled across all episodes
    pub waiters_enrolled: u64,
}

struct CoordinatorInner {
    machine: RenewalMachine,
    queue: WaiterQueue,
    next_ticket: u64,
    episode: u64,
    stats: CoordinatorStats,
}

/// Coordinates at most one outstanding renewal on behalf of all callers.
pub struct RenewalCoordinator {
    inner: Arc<Mutex<CoordinatorInner>>,
}

impl RenewalCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CoordinatorInner {
                machine: RenewalMachine::new(),
                queue: WaiterQueue::new(),
                next_ticket: 0,
                episode: 0,
                stats: CoordinatorStats::default(),
            })),
        }
    }

    /// Current renewal state.
    pub fn state(&self) -> RenewalState {
        RenewalState::from(self.inner.lock().machine.state())
    }

    /// Number of callers waiting on the current episode.
    pub fn queued(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CoordinatorStats {
        self.inner.lock().stats
    }

    /// Suspend until the current (or a freshly started) renewal resolves.
    ///
    /// `renew` is only invoked when this caller opens a new episode. Its future
    /// runs on a spawned task, so the episode settles every waiter even if the
    /// caller that started it goes away.
    pub async fn await_renewal<F, Fut>(&self, renew: F) -> RenewalOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RenewalOutcome> + Send + 'static,
    {
        let (receiver, started_episode) = self.enroll()?;

        if let Some(episode) = started_episode {
            self.spawn_renewal(episode, renew());
        }

        match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RenewalError::Aborted),
        }
    }

    /// Enroll a waiter; returns the episode number if this call started one.
    fn enroll(&self) -> Result<(oneshot::Receiver<RenewalOutcome>, Option<u64>), RenewalError> {
        let mut inner = self.inner.lock();

        let started_episode = match RenewalState::from(inner.machine.state()) {
            RenewalState::Idle => {
                inner
                    .machine
                    .consume(&RenewalMachineInput::RenewalStarted)
                    .map_err(|_| {
                        RenewalError::InvalidStateTransition(
                            "cannot start renewal".to_string(),
                        )
                    })?;
                inner.episode += 1;
                inner.stats.renewals_started += 1;
                Some(inner.episode)
            }
            RenewalState::Renewing => None,
        };

        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        let (waiter, receiver) = Waiter::new(ticket);
        inner.queue.enqueue(waiter);
        inner.stats.waiters_enrolled += 1;

        debug!(
            ticket,
            episode = inner.episode,
            queued = inner.queue.len(),
            leader = started_episode.is_some(),
            "Enrolled renewal waiter"
        );

        Ok((receiver, started_episode))
    }

    fn spawn_renewal<Fut>(&self, episode: u64, renewal: Fut)
    where
        Fut: Future<Output = RenewalOutcome> + Send + 'static,
    {
        info!(episode, "Starting session renewal");
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            // Inner task so a panicking renewal still settles the queue.
            let outcome = match tokio::spawn(renewal).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(episode, error = %e, "Renewal task did not complete");
                    Err(RenewalError::Aborted)
                }
            };
            complete(&inner, episode, outcome);
        });
    }
}

impl Default for RenewalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Return to Idle and settle the episode's waiters in enrollment order.
fn complete(inner: &Mutex<CoordinatorInner>, episode: u64, outcome: RenewalOutcome) {
    // Detach the queue in the same critical section as the transition, so a
    // caller enrolling after this point belongs to the next episode.
    let mut waiters = {
        let mut guard = inner.lock();
        let input = if outcome.is_ok() {
            guard.stats.renewals_succeeded += 1;
            RenewalMachineInput::RenewalSucceeded
        } else {
            guard.stats.renewals_failed += 1;
            RenewalMachineInput::RenewalFailed
        };
        if guard.machine.consume(&input).is_err() {
            error!(episode, input = ?input, "Renewal completed outside Renewing state");
        }
        std::mem::take(&mut guard.queue)
    };

    let waiting = waiters.len();
    let settled = waiters.drain_all(&outcome);

    match &outcome {
        Ok(()) => info!(episode, waiting, settled, "Session renewed, releasing waiters"),
        Err(e) => warn!(episode, waiting, settled, error = %e, "Session renewal failed, rejecting waiters"),
    }
}

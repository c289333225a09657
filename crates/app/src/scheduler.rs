//! Poll scheduler — the single debounce timer driving state polling.
//!
//! At most one poll is pending at any time: [`PollScheduler::schedule`]
//! replaces whatever was pending and [`PollScheduler::cancel`] clears it.
//! Only the dispatcher and the poller touch it, through `&mut` borrows held
//! by the runtime.

use std::future::pending;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Deadline of the next scheduled poll, if any.
#[derive(Debug, Default)]
pub struct PollScheduler {
    deadline: Option<Instant>,
}

impl PollScheduler {
    /// Schedule the next poll `delay` from now, replacing any pending one.
    ///
    /// A delay too large to represent leaves nothing pending.
    pub fn schedule(&mut self, delay: Duration) {
        self.deadline = Instant::now().checked_add(delay);
        if self.deadline.is_none() {
            tracing::warn!(?delay, "poll delay out of range, nothing scheduled");
        }
    }

    /// Drop the pending poll. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a poll is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending poll is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolve once the pending poll is due, consuming it.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future before it resolves leaves the deadline in place.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => pending::<()>().await,
        }
    }
}

//! Background sweep of expired pending confirmations.
//!
//! Lazy expiry only removes entries that are touched again. The sweeper
//! bounds memory for users who never come back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::dispatcher::Dispatcher;

/// Periodic task removing stale confirmations from a shared dispatcher.
pub struct ConfirmationSweeper {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl ConfirmationSweeper {
    pub fn new(dispatcher: Arc<Dispatcher>, interval: Duration) -> Self {
        Self {
            dispatcher,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Sweep once per interval until [`shutdown`](Self::shutdown) is called.
    ///
    /// The first sweep happens immediately.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.dispatcher.sweep_expired();
                    if removed > 0 {
                        tracing::info!(removed, remaining = self.dispatcher.pending_count(), "Swept expired confirmations");
                    }
                }
                _ = self.shutdown.notified() => {
                    tracing::debug!("Confirmation sweeper stopped");
                    return;
                }
            }
        }
    }

    /// Signal the sweeper to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

//! Periodic tick source for background refreshes
//!
//! The scheduler holds at most one timer. Starting an already running
//! scheduler keeps the existing timer; stopping or dropping it releases the
//! timer so no tick can fire afterwards.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fixed-period timer that can be switched on and off
#[derive(Debug)]
pub struct PollScheduler {
    period: Duration,
    interval: Option<Interval>,
}

impl PollScheduler {
    /// Creates a stopped scheduler
    ///
    /// # Arguments
    ///
    /// * `period` - Time between ticks, at least one millisecond
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Arms the timer; the first tick fires one period from now
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }

        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // A slow refresh must not cause a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        tracing::debug!("Polling started every {:?}", self.period);
    }

    /// Releases the timer
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            tracing::debug!("Polling stopped");
        }
    }

    /// Starts or stops the timer to match `active`
    pub fn set_running(&mut self, active: bool) {
        if active {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Waits for the next tick
    ///
    /// Never completes while the scheduler is stopped, so it can sit in a
    /// `tokio::select!` next to other events.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

//! Event loops tying the scheduler to the controllers
//!
//! Each loop re-evaluates the polling gate after every refresh: the timer
//! runs only while auto-refresh is on and some record is queued or running.

use crate::client::RecordApi;
use crate::detail::DetailWatcher;
use crate::poller::PollScheduler;
use crate::record::Record;
use crate::table::{TableController, TableView};
use std::future::Future;

/// Why a watch loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown future completed
    Shutdown,

    /// Nothing is left to poll
    Idle,
}

/// Counters for a finished watch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Timer ticks handled
    pub ticks: usize,

    /// Ticks that issued a request
    pub requests: usize,

    pub stopped: StopReason,
}

/// Keeps a table fresh until `shutdown` completes
///
/// Performs a foreground refresh first, then a silent refresh on every tick
/// while the polling gate is open. `on_update` receives a snapshot after
/// every refresh. With `stop_when_idle` the loop returns as soon as the gate
/// closes; otherwise it waits for `shutdown`.
pub async fn watch_table<A, S, F>(
    controller: &mut TableController<A>,
    scheduler: &mut PollScheduler,
    shutdown: S,
    stop_when_idle: bool,
    mut on_update: F,
) -> WatchSummary
where
    A: RecordApi,
    S: Future<Output = ()>,
    F: FnMut(&TableView),
{
    tokio::pin!(shutdown);

    controller.refresh(false).await;
    on_update(&controller.view());

    let mut ticks = 0;
    let mut requests = 0;

    let stopped = loop {
        let gate_open = controller.auto_refresh() && controller.has_active_records();
        scheduler.set_running(gate_open);

        if !gate_open && stop_when_idle {
            tracing::info!("No analyses in flight, stopping");
            break StopReason::Idle;
        }

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break StopReason::Shutdown;
            }
            _ = scheduler.tick() => {
                ticks += 1;
                if controller.poll().await.made_request() {
                    requests += 1;
                    on_update(&controller.view());
                }
            }
        }
    };

    scheduler.stop();
    WatchSummary {
        ticks,
        requests,
        stopped,
    }
}

/// Follows one record until its analysis finishes or `shutdown` completes
pub async fn watch_detail<A, S, F>(
    watcher: &mut DetailWatcher<A>,
    scheduler: &mut PollScheduler,
    shutdown: S,
    mut on_update: F,
) -> WatchSummary
where
    A: RecordApi,
    S: Future<Output = ()>,
    F: FnMut(Option<&Record>),
{
    tokio::pin!(shutdown);

    // An initial failure leaves nothing to watch; the error stays in the watcher
    let _ = watcher.refresh().await;
    on_update(watcher.record());

    let mut ticks = 0;
    let mut requests = 0;

    let stopped = loop {
        scheduler.set_running(watcher.is_active());
        if !watcher.is_active() {
            break StopReason::Idle;
        }

        tokio::select! {
            _ = &mut shutdown => break StopReason::Shutdown,
            _ = scheduler.tick() => {
                ticks += 1;
                if watcher.poll().await {
                    requests += 1;
                    on_update(watcher.record());
                }
            }
        }
    };

    scheduler.stop();
    WatchSummary {
        ticks,
        requests,
        stopped,
    }
}

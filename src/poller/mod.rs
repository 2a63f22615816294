//! Background polling
//!
//! This module handles:
//! - A switchable fixed-period timer (`PollScheduler`)
//! - Watch loops that refresh the table or a single record on each tick
//! - Stopping cleanly on shutdown or once every analysis is terminal

mod driver;
mod scheduler;

pub use driver::{watch_detail, watch_table, StopReason, WatchSummary};
pub use scheduler::PollScheduler;

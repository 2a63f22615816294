//! Record module for analysis results
//!
//! # Components
//!
//! - `RecordStatus`: the queued → running → done/error lifecycle driven by the server
//! - `Record`: one analyzed address with its metrics
//! - `RecordId`: stable identifier of a record across re-fetches

mod model;
mod status;

// Re-export main types
pub use model::{Record, RecordId};
pub use status::RecordStatus;

//! Live record table
//!
//! - `query`: the user's view parameters
//! - `view`: pure filter/sort/paginate derivation
//! - `selection`: checked rows, scoped to the current page
//! - `controller`: fetching, refresh ordering, polling gate and actions

mod controller;
mod query;
mod selection;
pub mod view;

pub use controller::{
    ActionOutcome, ErrorSource, PollOutcome, RefreshOutcome, RefreshTicket, RejectReason,
    TableController, TableError, TableView,
};
pub use query::{QueryState, SortField, SortOrder};
pub use selection::Selection;
pub use view::{derive_page, DerivedPage};

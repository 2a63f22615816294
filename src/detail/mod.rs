//! Detail view of a single analysis record

mod watcher;

pub use watcher::DetailWatcher;

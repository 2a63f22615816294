//! Pagewatch: a live client for a web page analysis service
//!
//! This crate submits web addresses to a remote analysis service, tracks each
//! analysis through its queued/running/done/error lifecycle, and keeps a
//! filterable, sortable, paginated table of analysis records fresh by polling
//! while any record is still in flight.

pub mod client;
pub mod config;
pub mod detail;
pub mod output;
pub mod poller;
pub mod record;
pub mod table;

use thiserror::Error;

/// Main error type for Pagewatch operations
#[derive(Debug, Error)]
pub enum PagewatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] client::ApiError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pagewatch operations
pub type Result<T> = std::result::Result<T, PagewatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{ApiError, HttpRecordApi, RecordApi};
pub use config::Config;
pub use record::{Record, RecordId, RecordStatus};
pub use table::{QueryState, SortField, SortOrder, TableController, TableView};

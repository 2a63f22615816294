//! Configuration module for Pagewatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use pagewatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagewatch.toml")).unwrap();
//! println!("Polling every {}ms", config.polling.list_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, PollingConfig, ServerConfig, TableConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

// Re-export validation for callers that adjust a loaded config
pub use validation::{validate, MAX_PAGE_SIZE};

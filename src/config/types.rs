use crate::table::{SortField, SortOrder};
use serde::Deserialize;

/// Main configuration structure for Pagewatch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Remote analysis service connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the analysis service (e.g. "http://localhost:8080")
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Static bearer token attached to every request
    #[serde(default = "default_token")]
    pub token: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Initial table view parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Rows per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: usize,

    /// Initial sort column
    #[serde(rename = "sort-field", default = "default_sort_field")]
    pub sort_field: SortField,

    /// Initial sort direction
    #[serde(rename = "sort-order", default = "default_sort_order")]
    pub sort_order: SortOrder,
}

/// Polling intervals
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Interval between table refreshes while work is in flight (milliseconds)
    #[serde(rename = "list-interval-ms", default = "default_list_interval_ms")]
    pub list_interval_ms: u64,

    /// Interval between detail refreshes while the record is in flight (milliseconds)
    #[serde(rename = "detail-interval-ms", default = "default_detail_interval_ms")]
    pub detail_interval_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_token() -> String {
    "devtoken123".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    10
}

fn default_sort_field() -> SortField {
    SortField::CreatedAt
}

fn default_sort_order() -> SortOrder {
    SortOrder::Desc
}

fn default_list_interval_ms() -> u64 {
    5000
}

fn default_detail_interval_ms() -> u64 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: default_token(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sort_field: default_sort_field(),
            sort_order: default_sort_order(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            list_interval_ms: default_list_interval_ms(),
            detail_interval_ms: default_detail_interval_ms(),
        }
    }
}

//! Record API trait and associated request/response types
//!
//! This module defines the contract the table controller depends on. The HTTP
//! implementation lives in `http.rs`; tests drive the controller through
//! in-memory implementations.

use crate::client::ApiError;
use crate::record::{Record, RecordId};
use crate::table::QueryState;
use async_trait::async_trait;
use std::fmt;
use url::Url;

/// How the returned rows relate to the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// The server applied the query and returned one page of `total` matches
    Server { total: usize },

    /// The server returned every record; the client slices locally
    Local,
}

/// Result of a list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Rows returned by the server
    pub records: Vec<Record>,

    /// Pagination mode of this response
    pub pagination: Pagination,
}

impl Listing {
    /// A listing holding the complete collection
    pub fn complete(records: Vec<Record>) -> Self {
        Self {
            records,
            pagination: Pagination::Local,
        }
    }

    /// A listing holding one server-side page out of `total` matches
    pub fn page(records: Vec<Record>, total: usize) -> Self {
        Self {
            records,
            pagination: Pagination::Server { total },
        }
    }
}

/// State-changing operations against the analysis service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Re-run analysis of one record
    Analyze(RecordId),

    /// Delete one record
    Delete(RecordId),

    /// Delete a batch of records in one request
    BulkDelete(Vec<RecordId>),

    /// Re-run a batch of records in one request
    BulkRerun(Vec<RecordId>),
}

impl Mutation {
    /// Ids affected by this mutation
    pub fn ids(&self) -> Vec<RecordId> {
        match self {
            Self::Analyze(id) | Self::Delete(id) => vec![*id],
            Self::BulkDelete(ids) | Self::BulkRerun(ids) => ids.clone(),
        }
    }

    /// Short operation name used in logs
    pub fn op(&self) -> &'static str {
        match self {
            Self::Analyze(_) => "analyze",
            Self::Delete(_) | Self::BulkDelete(_) => "delete",
            Self::BulkRerun(_) => "rerun",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.ids().iter().map(ToString::to_string).collect();
        write!(f, "{} [{}]", self.op(), ids.join(", "))
    }
}

/// Contract with the remote analysis service
///
/// Every call is a single round trip: no retries and no caching.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Lists records for the given view parameters
    async fn list(&self, query: &QueryState) -> Result<Listing, ApiError>;

    /// Fetches one record
    async fn get(&self, id: RecordId) -> Result<Record, ApiError>;

    /// Submits a new address for analysis and returns the id of the created record
    async fn submit(&self, address: &str) -> Result<RecordId, ApiError>;

    /// Applies a state-changing operation
    async fn mutate(&self, mutation: &Mutation) -> Result<(), ApiError>;
}

/// Validates an address before it is submitted
///
/// The address must be an absolute http(s) URL with a host. Surrounding
/// whitespace is ignored.
///
/// # Returns
///
/// * `Ok(Url)` - The parsed address
/// * `Err(ApiError::Validation)` - The address cannot be submitted
pub fn validate_address(address: &str) -> Result<Url, ApiError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("address cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ApiError::Validation(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::Validation(format!(
            "'{}' must use http or https",
            trimmed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::Validation(format!("'{}' has no host", trimmed)));
    }

    Ok(url)
}

//! HTTP implementation of the record API
//!
//! This module handles all requests to the analysis service, including:
//! - Building the HTTP client with timeouts and a user agent
//! - Attaching the bearer token to every request
//! - Decoding both list envelopes (paginated object and bare array)
//! - Classifying failures into [`ApiError`]
//!
//! Bulk operations use the two-route contract: `POST /api/urls/bulk-delete`
//! and `POST /api/urls/bulk-rerun`, each with an `{ "ids": [...] }` body.

use crate::client::traits::{validate_address, Listing, Mutation, RecordApi};
use crate::client::ApiError;
use crate::config::ServerConfig;
use crate::record::{Record, RecordId};
use crate::table::QueryState;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Collection endpoint, relative to the service base URL
const URLS_PATH: &str = "api/urls";

/// List response shapes accepted from the server
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    /// Paginated envelope: `{ urls, total, page, limit }`
    Page { urls: Vec<Record>, total: usize },

    /// Legacy bare array holding the whole collection
    Flat(Vec<Record>),
}

impl From<ListBody> for Listing {
    fn from(body: ListBody) -> Self {
        match body {
            ListBody::Page { urls, total } => Listing::page(urls, total),
            ListBody::Flat(records) => Listing::complete(records),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(alias = "ID")]
    id: RecordId,
}

#[derive(Debug, Serialize)]
struct IdsBody<'a> {
    ids: &'a [RecordId],
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The server configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ServerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("pagewatch/{}", env!("CARGO_PKG_VERSION"));
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Record API backed by the analysis service's HTTP interface
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpRecordApi {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpRecordApi {
    /// Creates an API client from the server configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpRecordApi)` - Ready to issue requests
    /// * `Err(PagewatchError)` - Invalid base URL or HTTP client setup failure
    pub fn new(config: &ServerConfig) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        let mut base_url = Url::parse(&config.base_url)?;

        // Url::join replaces the last segment unless the base path is a directory
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Validation(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| {
            let error = ApiError::from_transport(&e);
            tracing::debug!("Transport failure: {}", e);
            error
        })
    }
}

/// Fails with the server's error unless the response has a success status
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = ApiError::from_response(status, &body);
    tracing::debug!("Server responded with HTTP {}: {}", status.as_u16(), error);
    Err(error)
}

/// Decodes a JSON body from a successful response
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl RecordApi for HttpRecordApi {
    async fn list(&self, query: &QueryState) -> Result<Listing, ApiError> {
        let mut url = self.endpoint(URLS_PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &query.page().to_string())
            .append_pair("limit", &query.page_size().to_string())
            .append_pair("search", query.search_term())
            .append_pair("sort", query.sort_field().as_str())
            .append_pair("order", query.sort_order().as_str());

        tracing::debug!("GET {}", url);
        let response = self.send(self.request(Method::GET, url)).await?;
        let body: ListBody = read_json(response).await?;
        let listing = Listing::from(body);

        tracing::trace!(
            "Listed {} records ({:?})",
            listing.records.len(),
            listing.pagination
        );
        Ok(listing)
    }

    async fn get(&self, id: RecordId) -> Result<Record, ApiError> {
        let url = self.endpoint(&format!("{}/{}", URLS_PATH, id))?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.request(Method::GET, url)).await?;
        read_json(response).await
    }

    async fn submit(&self, address: &str) -> Result<RecordId, ApiError> {
        validate_address(address)?;
        let address = address.trim();
        let url = self.endpoint(URLS_PATH)?;

        tracing::debug!("POST {} ({})", url, address);
        let request = self
            .request(Method::POST, url)
            .json(&SubmitBody { url: address });
        let response = self.send(request).await?;
        let created: Created = read_json(response).await?;
        Ok(created.id)
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<(), ApiError> {
        let request = match mutation {
            Mutation::Analyze(id) => {
                let url = self.endpoint(&format!("{}/{}/analyze", URLS_PATH, id))?;
                self.request(Method::POST, url)
            }
            Mutation::Delete(id) => {
                let url = self.endpoint(&format!("{}/{}", URLS_PATH, id))?;
                self.request(Method::DELETE, url)
            }
            Mutation::BulkDelete(ids) => {
                let url = self.endpoint(&format!("{}/bulk-delete", URLS_PATH))?;
                self.request(Method::POST, url).json(&IdsBody { ids })
            }
            Mutation::BulkRerun(ids) => {
                let url = self.endpoint(&format!("{}/bulk-rerun", URLS_PATH))?;
                self.request(Method::POST, url).json(&IdsBody { ids })
            }
        };

        tracing::debug!("Mutation {}", mutation);
        let response = self.send(request).await?;
        check_status(response).await?;
        Ok(())
    }
}

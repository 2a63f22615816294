//! Client module for the remote analysis service
//!
//! This module contains the fetch client contract and its HTTP implementation:
//! - The `RecordApi` trait the table controller is written against
//! - Authenticated JSON requests over reqwest
//! - The typed error taxonomy surfaced to the controller
//! - Client-side validation of submitted addresses

mod error;
mod http;
mod traits;

pub use error::ApiError;
pub use http::{build_http_client, HttpRecordApi};
pub use traits::{validate_address, Listing, Mutation, Pagination, RecordApi};

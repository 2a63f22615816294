//! Error taxonomy for calls against the analysis service

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced by the record API
///
/// Cloneable so the table controller can keep the latest one in its error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure, no response was received
    #[error("Network failure: {0}")]
    Network(String),

    /// Non-success status with a decodable `{error}` body, message surfaced verbatim
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Non-success status without a decodable body
    #[error("Request failed (HTTP {status})")]
    ServerOpaque { status: u16 },

    /// Rejected client-side before any request was made
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Success status whose body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Wire shape of a server error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Classifies a transport error from the HTTP client
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Network("Request timeout".to_string())
        } else if error.is_connect() {
            Self::Network("Connection refused".to_string())
        } else {
            Self::Network(error.to_string())
        }
    }

    /// Builds the error for a non-success response from its status and raw body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.error.trim().is_empty() => Self::Server {
                status: status.as_u16(),
                message: parsed.error,
            },
            _ => Self::ServerOpaque {
                status: status.as_u16(),
            },
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::ServerOpaque { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure happened before anything was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

//! Client for the external store API.
//!
//! # Architecture
//!
//! - One base client for every endpoint, JSON in and out
//! - The API owns products, orders, and reports; nothing is cached locally
//! - Caller identity travels as a bearer token obtained out of band
//!
//! # Endpoints
//!
//! ```text
//! GET  /products               - Search/filter products (?search=&category=)
//! GET  /products/:id           - Product detail
//! POST /orders                 - Create an order from cart lines
//! GET  /orders/my-orders       - Caller's order history
//! GET  /reports/daily-revenue  - Revenue per day (admin)
//! GET  /reports/category-stats - Product counts and average price per category (admin)
//! GET  /reports/top-customers  - Customers ranked by spend (admin)
//! ```

mod client;
pub mod types;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the external API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status.
    #[error("API error: {status}{}", .message.as_ref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the JSON body, if the body had one.
        message: Option<String>,
    },

    /// The response body was not the JSON shape we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the configured base.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Coarse classification used by views when deciding what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The API rejected the request or failed while handling it.
    ValidationOrServer,
    /// The request never got a response.
    Network,
}

/// Message shown when the API gives no reason for a failure.
pub const UNKNOWN_ERROR: &str = "Unknown error";

impl ApiError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Status { .. } | Self::Parse(_) => ErrorKind::ValidationOrServer,
            Self::Http(_) | Self::InvalidUrl(_) => ErrorKind::Network,
        }
    }

    /// The server-provided reason, or [`UNKNOWN_ERROR`].
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message,
            _ => UNKNOWN_ERROR,
        }
    }
}

/// Pull the `error` string out of a JSON error body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

//! HTTP clients for the three chat providers.
//!
//! Each client wraps one provider's REST surface behind typed methods; the
//! adapters never touch `reqwest` directly. All providers answer with the
//! same `{ success, data, error }` envelope.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub mod official;
pub mod page;
pub mod personal;

/// HTTP connect timeout shared by all provider clients.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// HTTP request timeout for normal (non-streaming) operations.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors from provider HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but rejected the call.
    #[error("provider rejected the call: {0}")]
    Rejected(String),

    /// The provider bridge is running but the account is not linked.
    #[error("account not connected")]
    NotConnected,
}

/// Response envelope shared by the provider HTTP APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[allow(dead_code)]
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    pub(crate) error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, mapping a missing payload to the provider's error
    /// message (or a generic one).
    pub(crate) fn into_data(self) -> Result<T, ProviderError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(ProviderError::Rejected(
                self.error.unwrap_or_else(|| "empty response".to_owned()),
            )),
        }
    }
}

/// Build the shared request client with connect and request timeouts.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build HTTP client with timeouts, using default");
            reqwest::Client::default()
        })
}

/// Build a client for long-lived streaming requests: connect timeout only,
/// no overall request deadline.
pub(crate) fn streaming_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build streaming HTTP client, using default");
            reqwest::Client::default()
        })
}

//! HTTP client for the personal-channel bridge.
//!
//! The personal account is served by a device-linked bridge process; all
//! operations (status, linked sessions, conversations, messages, sends, and
//! the QR login stream) go through its HTTP API.

use serde::Deserialize;
use tracing::{debug, warn};

use super::{http_client, streaming_client, Envelope, ProviderError};

/// Default port the personal bridge listens on.
pub const DEFAULT_BRIDGE_PORT: u16 = 3001;

/// Number of health-check retries before giving up.
const HEALTH_CHECK_RETRIES: u32 = 5;

/// Delay between health-check attempts in milliseconds.
const HEALTH_CHECK_DELAY_MS: u64 = 2000;

/// Connection status reported by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeStatus {
    /// Whether the bridge holds a linked, live account session.
    pub connected: bool,
    /// The linked account identifier, if connected.
    pub account_id: Option<String>,
}

/// One authenticated account session known to the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedSession {
    /// Account identifier.
    pub account_id: String,
    /// Display name, if known.
    pub display_name: Option<String>,
    /// Whether the session is currently live.
    pub connected: bool,
}

/// Raw conversation entry as returned by the bridge.
///
/// At most one of the identifier fields is guaranteed present.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalConversation {
    /// Primary conversation id.
    pub conversation_id: Option<String>,
    /// Thread id.
    pub thread_id: Option<String>,
    /// Peer id.
    pub peer_id: Option<String>,
    /// Contact display name.
    pub name: Option<String>,
    /// Last-message preview.
    pub preview: Option<String>,
    /// Last activity as epoch seconds.
    pub last_activity: Option<i64>,
    /// Unread counter.
    pub unread: Option<u32>,
}

/// Raw message entry as returned by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalMessage {
    /// Bridge-assigned message identifier.
    pub message_id: Option<String>,
    /// Message text content.
    pub text: String,
    /// Whether this message was sent by us.
    pub from_me: bool,
    /// Epoch seconds, if available.
    pub timestamp: Option<i64>,
}

/// Client for the personal-channel bridge HTTP API.
pub struct PersonalClient {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    base_url: String,
}

impl PersonalClient {
    /// Create a new client pointing at the given base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            client: http_client(),
            stream_client: streaming_client(),
            base_url,
        }
    }

    /// Create a client connecting to `http://127.0.0.1:{port}`.
    pub fn with_port(port: u16) -> Self {
        Self::new(format!("http://127.0.0.1:{port}"))
    }

    /// Check whether the bridge is reachable and holds a live session.
    pub async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/status", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body: Envelope<BridgeStatus> = resp.json().await?;
                Ok(body.data.is_some_and(|s| s.connected))
            }
            Ok(_) => Ok(false),
            Err(_) => Ok(false),
        }
    }

    /// Wait for the bridge to become healthy, retrying with a fixed delay.
    pub async fn wait_healthy(&self) -> Result<(), ProviderError> {
        for attempt in 0..HEALTH_CHECK_RETRIES {
            if self.health_check().await.unwrap_or(false) {
                return Ok(());
            }
            if attempt < HEALTH_CHECK_RETRIES.saturating_sub(1) {
                tokio::time::sleep(std::time::Duration::from_millis(HEALTH_CHECK_DELAY_MS)).await;
            }
        }
        Err(ProviderError::NotConnected)
    }

    /// Get the current connection status from the bridge.
    pub async fn status(&self) -> Result<BridgeStatus, ProviderError> {
        let url = format!("{}/status", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<BridgeStatus> = resp.json().await?;
        body.into_data()
    }

    /// List the authenticated account sessions known to the bridge.
    pub async fn sessions(&self) -> Result<Vec<LinkedSession>, ProviderError> {
        let url = format!("{}/sessions", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<Vec<LinkedSession>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Fetch the raw conversation list for the linked account.
    pub async fn conversations(&self) -> Result<Vec<PersonalConversation>, ProviderError> {
        let url = format!("{}/conversations", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<Vec<PersonalConversation>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Fetch recent messages for one conversation.
    pub async fn messages(
        &self,
        conversation_id: &str,
        limit: u32,
    ) -> Result<Vec<PersonalMessage>, ProviderError> {
        let url = format!("{}/messages/{conversation_id}?limit={limit}", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<Vec<PersonalMessage>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Send a text message to the given conversation.
    ///
    /// Returns the bridge-assigned message id when the bridge reports one.
    pub async fn send_text(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/send", self.base_url);
        let body = serde_json::json!({ "conversation_id": conversation_id, "text": text });
        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            warn!(%status, "personal send failed: {body_text}");
            return Err(ProviderError::NotConnected);
        }
        let envelope: Envelope<serde_json::Value> = resp.json().await?;
        let message_id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("message_id"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        debug!(conversation_id, "message sent via personal bridge");
        Ok(message_id)
    }

    /// Open the QR login event stream.
    ///
    /// The response body is a long-lived SSE-style stream; the caller owns
    /// reading and parsing it. No request deadline is applied.
    pub async fn open_login_stream(&self) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/login/stream", self.base_url);
        let resp = self.stream_client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::Rejected(format!(
                "login stream returned status {}",
                resp.status()
            )));
        }
        Ok(resp)
    }

    /// Returns the base URL of the bridge.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

//! HTTP client for the page-messaging platform.
//!
//! Page threads are listed by thread key, but sends are addressed to a
//! provider-specific recipient identifier; the two are not interchangeable.

use serde::Deserialize;
use tracing::{debug, warn};

use super::{http_client, Envelope, ProviderError};

/// Raw thread entry for a page inbox.
#[derive(Debug, Clone, Deserialize)]
pub struct PageThread {
    /// Canonical thread identifier.
    pub thread_key: String,
    /// Recipient identifier required for sends, when the platform exposes it.
    pub recipient_id: Option<String>,
    /// Participant display name.
    pub participant_name: Option<String>,
    /// Last-message snippet.
    pub snippet: Option<String>,
    /// Last update as epoch seconds.
    pub updated_time: Option<i64>,
    /// Unread counter.
    pub unread: Option<u32>,
}

/// Raw message entry in a page thread.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMessage {
    /// Platform-assigned message identifier.
    pub message_id: Option<String>,
    /// Message text.
    pub text: String,
    /// Whether the page (vs. the visitor) sent the message.
    pub from_page: bool,
    /// Epoch seconds, if available.
    pub timestamp: Option<i64>,
}

/// Client for the page-messaging platform API.
pub struct PageClient {
    client: reqwest::Client,
    base_url: String,
    page_id: String,
    access_token: String,
}

impl PageClient {
    /// Create a new client for the given page.
    pub fn new(base_url: String, page_id: String, access_token: String) -> Self {
        Self {
            client: http_client(),
            base_url,
            page_id,
            access_token,
        }
    }

    /// Fetch the page's thread list.
    pub async fn threads(&self) -> Result<Vec<PageThread>, ProviderError> {
        let url = format!(
            "{}/pages/{}/threads?access_token={}",
            self.base_url, self.page_id, self.access_token
        );
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<Vec<PageThread>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Fetch recent messages for one thread.
    pub async fn messages(
        &self,
        thread_key: &str,
        limit: u32,
    ) -> Result<Vec<PageMessage>, ProviderError> {
        let url = format!(
            "{}/pages/{}/threads/{thread_key}/messages?limit={limit}&access_token={}",
            self.base_url, self.page_id, self.access_token
        );
        let resp = self.client.get(&url).send().await?;
        let body: Envelope<Vec<PageMessage>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Send a text message to a recipient identifier (not a thread key).
    pub async fn send_text(
        &self,
        recipient_id: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/pages/{}/messages?access_token={}",
            self.base_url, self.page_id, self.access_token
        );
        let body = serde_json::json!({ "recipient_id": recipient_id, "text": text });
        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            warn!(%status, "page send failed: {body_text}");
            return Err(ProviderError::Rejected(format!("send returned status {status}")));
        }
        let envelope: Envelope<serde_json::Value> = resp.json().await?;
        let message_id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("message_id"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        debug!(recipient_id, "message sent via page messaging");
        Ok(message_id)
    }
}

//! HTTP client for the official-account messaging platform.
//!
//! Official-account conversations are scoped to one business account; every
//! call carries the account identifier recovered from the UI channel id.

use serde::Deserialize;
use tracing::{debug, warn};

use super::{http_client, Envelope, ProviderError};

/// Raw conversation entry for an official account.
#[derive(Debug, Clone, Deserialize)]
pub struct OfficialConversation {
    /// Canonical contact identifier on the platform.
    pub open_id: String,
    /// Contact nickname, if known.
    pub nickname: Option<String>,
    /// Last-message preview.
    pub preview: Option<String>,
    /// Last activity as epoch seconds.
    pub last_activity: Option<i64>,
    /// Unread counter.
    pub unread: Option<u32>,
}

/// Raw message entry for an official-account conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct OfficialMessage {
    /// Platform-assigned message identifier.
    pub message_id: Option<String>,
    /// Message content, possibly a serialized rich-content envelope.
    pub content: String,
    /// Whether the message was sent by the account (vs. the contact).
    pub from_account: bool,
    /// Epoch seconds, if available.
    pub timestamp: Option<i64>,
}

/// Client for the official-account platform API.
pub struct OfficialClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl OfficialClient {
    /// Create a new client for the given platform base URL and token.
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            client: http_client(),
            base_url,
            access_token,
        }
    }

    /// Fetch the conversation list for one business account.
    pub async fn conversations(
        &self,
        account_id: &str,
    ) -> Result<Vec<OfficialConversation>, ProviderError> {
        let url = format!("{}/accounts/{account_id}/conversations", self.base_url);
        let resp = self.bearer(self.client.get(&url)).send().await?;
        let body: Envelope<Vec<OfficialConversation>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Fetch recent messages exchanged with one contact.
    pub async fn messages(
        &self,
        account_id: &str,
        open_id: &str,
        limit: u32,
    ) -> Result<Vec<OfficialMessage>, ProviderError> {
        let url = format!(
            "{}/accounts/{account_id}/messages/{open_id}?limit={limit}",
            self.base_url
        );
        let resp = self.bearer(self.client.get(&url)).send().await?;
        let body: Envelope<Vec<OfficialMessage>> = resp.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    /// Send a text message to a contact of the given account.
    pub async fn send_text(
        &self,
        account_id: &str,
        open_id: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/accounts/{account_id}/send", self.base_url);
        let body = serde_json::json!({ "open_id": open_id, "text": text });
        let resp = self.bearer(self.client.post(&url)).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            warn!(%status, account_id, "official-account send failed: {body_text}");
            return Err(ProviderError::Rejected(format!("send returned status {status}")));
        }
        let envelope: Envelope<serde_json::Value> = resp.json().await?;
        let message_id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("message_id"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        debug!(account_id, open_id, "message sent via official account");
        Ok(message_id)
    }

    fn bearer(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.access_token))
    }
}

//! Adapter for the official-account channel.
//!
//! Conversations are scoped to one business account at a time; the account
//! is picked by the UI channel id `official-account-<accountId>`.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::identity::{RawConversationRecord, RawProfile};
use crate::providers::official::{OfficialClient, OfficialConversation};
use crate::types::{Channel, Conversation, Message};

use super::{
    normalize_message, require_text, AdapterError, ChannelAdapter, ConversationStore, SendError,
    SendReceipt, MESSAGE_FETCH_LIMIT,
};

/// Prefix carried by official-account UI channel ids.
const CHANNEL_ID_PREFIX: &str = "official-account-";

/// Extract the account identifier from a UI channel id.
///
/// `"official-account-acct42"` yields `Some("acct42")`. A missing prefix or
/// an empty suffix means "no account selected"; an empty-string account id
/// is never treated as valid.
pub fn account_id_from_channel_id(channel_id: &str) -> Option<&str> {
    match channel_id.strip_prefix(CHANNEL_ID_PREFIX) {
        Some(rest) if !rest.is_empty() => Some(rest),
        _ => None,
    }
}

/// Official-account adapter.
pub struct OfficialAdapter {
    client: Arc<OfficialClient>,
    store: ConversationStore,
    account_id: RwLock<Option<String>>,
}

impl OfficialAdapter {
    /// Create an adapter over the given platform client.
    pub fn new(client: Arc<OfficialClient>) -> Self {
        Self {
            client,
            store: ConversationStore::new(),
            account_id: RwLock::new(None),
        }
    }

    /// Pick the business account from a UI channel id. An unparseable id
    /// clears the selection.
    pub fn select_account(&self, channel_id: &str) {
        let account = account_id_from_channel_id(channel_id).map(str::to_owned);
        if account.is_none() {
            debug!(channel_id, "no account selected from channel id");
        }
        if let Ok(mut guard) = self.account_id.write() {
            *guard = account;
        }
    }

    /// Currently selected business account, if any.
    pub fn account_id(&self) -> Option<String> {
        self.account_id.read().ok().and_then(|guard| guard.clone())
    }

    /// Replace the raw record list directly, bypassing the provider.
    #[doc(hidden)]
    pub fn seed_records_for_testing(&self, records: Vec<RawConversationRecord>) {
        self.store.replace_records(records);
    }

    fn record_from_wire(raw: OfficialConversation) -> RawConversationRecord {
        RawConversationRecord::OfficialAccount {
            open_id: raw.open_id,
            profile: RawProfile {
                name: raw.nickname.unwrap_or_default(),
                preview: raw.preview.unwrap_or_default(),
                last_activity: raw.last_activity.unwrap_or(0),
                unread: raw.unread.unwrap_or(0),
            },
        }
    }
}

#[async_trait]
impl ChannelAdapter for OfficialAdapter {
    fn channel(&self) -> Channel {
        Channel::OfficialAccount
    }

    async fn refresh(&self) -> Result<usize, AdapterError> {
        let Some(account) = self.account_id() else {
            // No account selected: nothing to fetch, nothing to show.
            self.store.replace_records(Vec::new());
            return Ok(0);
        };
        let raw = self.client.conversations(&account).await?;
        let records = raw.into_iter().map(Self::record_from_wire).collect();
        let count = self.store.replace_records(records);
        debug!(channel = %self.channel(), account, count, "conversation list refreshed");
        Ok(count)
    }

    fn list_conversations(&self) -> Vec<Conversation> {
        self.store.snapshot()
    }

    fn select_conversation(&self, id: &str) {
        self.store.select(id);
    }

    fn active_conversation(&self) -> Option<String> {
        self.store.active()
    }

    async fn load_messages(&self) -> Result<usize, AdapterError> {
        let (Some(account), Some(active)) = (self.account_id(), self.store.active()) else {
            return Ok(0);
        };
        let raw = self
            .client
            .messages(&account, &active, MESSAGE_FETCH_LIMIT)
            .await?;
        let messages = raw
            .into_iter()
            .map(|m| normalize_message(m.message_id, m.content, m.from_account, m.timestamp))
            .collect();
        Ok(self.store.set_messages(messages))
    }

    fn messages_for_active(&self) -> Vec<Message> {
        self.store.messages()
    }

    async fn send_text(&self, text: &str) -> Result<SendReceipt, SendError> {
        let Some(active) = self.store.active() else {
            return Err(SendError::NoActiveConversation);
        };
        let text = require_text(text)?;
        let Some(account) = self.account_id() else {
            return Err(SendError::NoActiveConversation);
        };
        let message_id = self.client.send_text(&account, &active, text).await?;
        Ok(SendReceipt::new(self.channel(), message_id))
    }
}

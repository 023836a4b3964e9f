//! Adapter for the QR-linked personal channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::identity::{RawConversationRecord, RawProfile};
use crate::providers::personal::{PersonalClient, PersonalConversation};
use crate::types::{Channel, Conversation, Message};

use super::{
    normalize_message, require_text, AdapterError, ChannelAdapter, ConversationStore, SendError,
    SendReceipt, MESSAGE_FETCH_LIMIT,
};

/// Personal-channel adapter backed by the device-linked bridge.
pub struct PersonalAdapter {
    client: Arc<PersonalClient>,
    store: ConversationStore,
}

impl PersonalAdapter {
    /// Create an adapter over the given bridge client.
    pub fn new(client: Arc<PersonalClient>) -> Self {
        Self {
            client,
            store: ConversationStore::new(),
        }
    }

    /// Replace the raw record list directly, bypassing the provider.
    #[doc(hidden)]
    pub fn seed_records_for_testing(&self, records: Vec<RawConversationRecord>) {
        self.store.replace_records(records);
    }

    /// Replace the loaded message list directly, bypassing the provider.
    #[doc(hidden)]
    pub fn seed_messages_for_testing(&self, messages: Vec<Message>) {
        self.store.set_messages(messages);
    }

    fn record_from_wire(raw: PersonalConversation) -> RawConversationRecord {
        RawConversationRecord::Personal {
            conversation_id: raw.conversation_id,
            thread_id: raw.thread_id,
            peer_id: raw.peer_id,
            profile: RawProfile {
                name: raw.name.unwrap_or_default(),
                preview: raw.preview.unwrap_or_default(),
                last_activity: raw.last_activity.unwrap_or(0),
                unread: raw.unread.unwrap_or(0),
            },
        }
    }
}

#[async_trait]
impl ChannelAdapter for PersonalAdapter {
    fn channel(&self) -> Channel {
        Channel::Personal
    }

    async fn refresh(&self) -> Result<usize, AdapterError> {
        let raw = self.client.conversations().await?;
        let records = raw.into_iter().map(Self::record_from_wire).collect();
        let count = self.store.replace_records(records);
        debug!(channel = %self.channel(), count, "conversation list refreshed");
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
        let Some(active) = self.store.active() else {
            return Ok(0);
        };
        let raw = self.client.messages(&active, MESSAGE_FETCH_LIMIT).await?;
        let messages = raw
            .into_iter()
            .map(|m| normalize_message(m.message_id, m.text, m.from_me, m.timestamp))
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
        let message_id = self.client.send_text(&active, text).await?;
        Ok(SendReceipt::new(self.channel(), message_id))
    }
}

//! Adapter for the page-messaging channel.
//!
//! Threads are identified by thread key, but sends must be addressed to the
//! provider's recipient identifier. The mapping lives on the raw record; a
//! thread without one cannot be written to.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::identity::{RawConversationRecord, RawProfile};
use crate::providers::page::{PageClient, PageThread};
use crate::types::{Channel, Conversation, Message};

use super::{
    normalize_message, require_text, AdapterError, ChannelAdapter, ConversationStore, SendError,
    SendReceipt, MESSAGE_FETCH_LIMIT,
};

/// Page-messaging adapter.
pub struct PageAdapter {
    client: Arc<PageClient>,
    store: ConversationStore,
}

impl PageAdapter {
    /// Create an adapter over the given page client.
    pub fn new(client: Arc<PageClient>) -> Self {
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

    fn record_from_wire(raw: PageThread) -> RawConversationRecord {
        RawConversationRecord::PageMessaging {
            thread_key: raw.thread_key,
            recipient_id: raw.recipient_id,
            profile: RawProfile {
                name: raw.participant_name.unwrap_or_default(),
                preview: raw.snippet.unwrap_or_default(),
                last_activity: raw.updated_time.unwrap_or(0),
                unread: raw.unread.unwrap_or(0),
            },
        }
    }
}

#[async_trait]
impl ChannelAdapter for PageAdapter {
    fn channel(&self) -> Channel {
        Channel::PageMessaging
    }

    async fn refresh(&self) -> Result<usize, AdapterError> {
        let raw = self.client.threads().await?;
        let records = raw.into_iter().map(Self::record_from_wire).collect();
        let count = self.store.replace_records(records);
        debug!(channel = %self.channel(), count, "thread list refreshed");
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
            .map(|m| normalize_message(m.message_id, m.text, m.from_page, m.timestamp))
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
        // Thread key -> recipient identifier, before any network call.
        let recipient = self
            .store
            .with_active_record(|record| record.recipient_id().map(str::to_owned))
            .flatten()
            .ok_or_else(|| SendError::RecipientUnresolved(active.clone()))?;
        let message_id = self.client.send_text(&recipient, text).await?;
        Ok(SendReceipt::new(self.channel(), message_id))
    }
}

//! Channel adapters: one owner of raw conversation state per chat backend.
//!
//! Each adapter holds its channel's raw records, the active selection, and
//! the messages loaded for it, and normalizes everything into the unified
//! [`Conversation`]/[`Message`] model. The aggregator only reads through the
//! [`ChannelAdapter`] surface and never mutates adapter internals.

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::identity::{self, RawConversationRecord};
use crate::providers::ProviderError;
use crate::types::{self, Channel, Conversation, Message, Sender};

pub mod official;
pub mod page;
pub mod personal;

/// How many messages one `load_messages` call asks the provider for.
pub(crate) const MESSAGE_FETCH_LIMIT: u32 = 50;

/// Errors from refreshing adapter state from a provider.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The provider fetch failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Typed outcome of a failed send. Send failures are returned to the caller,
/// never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Nothing is selected on this adapter.
    #[error("no active conversation selected")]
    NoActiveConversation,

    /// The message text is blank after trimming.
    #[error("message text is empty")]
    EmptyMessage,

    /// The unified conversation id could not be mapped to a provider
    /// recipient identifier (page-messaging only). No network call was made.
    #[error("no recipient identifier for conversation '{0}'")]
    RecipientUnresolved(String),

    /// The provider send call itself failed.
    #[error("provider send failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Receipt for a send the provider accepted.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Provider-assigned message id, or a bridge-generated one when the
    /// provider returns none.
    pub message_id: String,
    /// Channel that carried the message.
    pub channel: Channel,
}

impl SendReceipt {
    pub(crate) fn new(channel: Channel, provider_id: Option<String>) -> Self {
        Self {
            message_id: provider_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            channel,
        }
    }
}

/// Common surface every channel adapter implements.
///
/// Snapshot reads (`list_conversations`, `messages_for_active`,
/// `active_conversation`) never block; the async operations are exactly the
/// network-bound ones.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Channel this adapter serves.
    fn channel(&self) -> Channel;

    /// Fetch the raw conversation list from the provider and replace local
    /// state. Returns the number of records fetched.
    async fn refresh(&self) -> Result<usize, AdapterError>;

    /// Normalized snapshot of the current conversation list.
    fn list_conversations(&self) -> Vec<Conversation>;

    /// Mark the record resolving to `id` as active. An unknown id is an
    /// idempotent no-op: the prior selection stays untouched, so a transient
    /// fetch race cannot clear a valid selection.
    fn select_conversation(&self, id: &str);

    /// Resolved id of the active record, if any.
    fn active_conversation(&self) -> Option<String>;

    /// Fetch messages for the active record from the provider. Returns the
    /// number fetched; 0 (without a network call) when nothing is active.
    async fn load_messages(&self) -> Result<usize, AdapterError>;

    /// Messages loaded for the active record; empty when nothing is active.
    fn messages_for_active(&self) -> Vec<Message>;

    /// Send text to the active conversation.
    async fn send_text(&self, text: &str) -> Result<SendReceipt, SendError>;
}

/// Normalize one raw record into a unified conversation (messages empty).
pub(crate) fn normalize(record: &RawConversationRecord) -> Conversation {
    let profile = record.profile();
    Conversation {
        id: identity::resolve(record).to_owned(),
        channel: record.channel(),
        display_name: profile.name.clone(),
        avatar_initial: types::avatar_initial(&profile.name),
        preview_text: profile.preview.clone(),
        last_activity_label: types::activity_label(profile.last_activity),
        unread_count: profile.unread,
        messages: Vec::new(),
    }
}

/// Normalize one provider message from its common parts.
pub(crate) fn normalize_message(
    id: Option<String>,
    text: String,
    from_me: bool,
    timestamp: Option<i64>,
) -> Message {
    Message {
        id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        text,
        sent_at_label: timestamp.map(types::activity_label).unwrap_or_default(),
        sender: if from_me { Sender::Bot } else { Sender::User },
    }
}

struct StoreInner {
    records: Vec<RawConversationRecord>,
    active: Option<String>,
    messages: Vec<Message>,
}

/// Local conversation state shared by the three adapter implementations.
///
/// Every mutation is one synchronous critical section, so a
/// `select_conversation` followed by `messages_for_active` on the same flow
/// always observes the just-selected record.
pub(crate) struct ConversationStore {
    inner: RwLock<StoreInner>,
}

impl ConversationStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: Vec::new(),
                active: None,
                messages: Vec::new(),
            }),
        }
    }

    /// Replace the raw record list. The active id is kept as-is; a late
    /// fetch may therefore leave a selection that no longer resolves, which
    /// callers tolerate as "no active selection".
    pub(crate) fn replace_records(&self, records: Vec<RawConversationRecord>) -> usize {
        let count = records.len();
        if let Ok(mut inner) = self.inner.write() {
            inner.records = records;
        }
        count
    }

    /// Normalized snapshot; the active conversation carries its messages.
    pub(crate) fn snapshot(&self) -> Vec<Conversation> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .records
            .iter()
            .map(|record| {
                let mut conversation = normalize(record);
                if inner.active.as_deref() == Some(conversation.id.as_str()) {
                    conversation.messages = inner.messages.clone();
                }
                conversation
            })
            .collect()
    }

    /// Select the record resolving to `id`, zeroing its local unread count.
    /// A miss leaves the prior selection unchanged. The empty string is the
    /// unidentified-record sentinel, never a selectable id.
    pub(crate) fn select(&self, id: &str) {
        if id.is_empty() {
            return;
        }
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        let position = inner
            .records
            .iter()
            .position(|record| identity::resolve(record) == id);
        if let Some(index) = position {
            if inner.active.as_deref() != Some(id) {
                inner.messages.clear();
            }
            inner.active = Some(id.to_owned());
            inner.records[index].profile_mut().unread = 0;
        }
    }

    pub(crate) fn active(&self) -> Option<String> {
        self.inner.read().ok().and_then(|inner| inner.active.clone())
    }

    /// Read something off the active record, if one still resolves.
    pub(crate) fn with_active_record<R>(
        &self,
        f: impl FnOnce(&RawConversationRecord) -> R,
    ) -> Option<R> {
        let inner = self.inner.read().ok()?;
        let active = inner.active.as_deref()?;
        inner
            .records
            .iter()
            .find(|record| identity::resolve(record) == active)
            .map(f)
    }

    pub(crate) fn set_messages(&self, messages: Vec<Message>) -> usize {
        let count = messages.len();
        if let Ok(mut inner) = self.inner.write() {
            inner.messages = messages;
        }
        count
    }

    pub(crate) fn messages(&self) -> Vec<Message> {
        self.inner
            .read()
            .map(|inner| inner.messages.clone())
            .unwrap_or_default()
    }
}

/// Reject blank text before any network call.
pub(crate) fn require_text(text: &str) -> Result<&str, SendError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SendError::EmptyMessage);
    }
    Ok(trimmed)
}

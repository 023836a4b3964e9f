//! Conversation aggregator/router across the channel adapters.
//!
//! The hub composes the adapters in a fixed order, merges their normalized
//! conversation lists into one cross-channel view, and routes sends back to
//! the adapter owning the conversation's channel. It reads adapter state
//! only through the [`ChannelAdapter`] surface.

use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::adapters::{ChannelAdapter, SendError, SendReceipt};
use crate::types::{Channel, Conversation};

/// Errors from routing a send across channels.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The conversation's channel tag matches no registered adapter.
    /// Unreachable when the hub holds all three adapters; kept as a guard.
    #[error("no adapter registered for channel '{0}'")]
    UnknownChannel(Channel),

    /// The owning adapter rejected or failed the send.
    #[error(transparent)]
    Send(#[from] SendError),
}

/// Cross-channel conversation hub.
///
/// Per-channel active selections live in the adapters; the merged-view
/// selection is tracked here, separately, so the "all conversations" view
/// and the single-channel views never fight over one selection variable.
pub struct ConversationHub {
    adapters: Vec<Arc<dyn ChannelAdapter>>,
    merged_selection: RwLock<Option<(Channel, String)>>,
}

impl ConversationHub {
    /// Build a hub over adapters in presentation order (personal, then
    /// official-account, then page-messaging).
    pub fn new(adapters: Vec<Arc<dyn ChannelAdapter>>) -> Self {
        Self {
            adapters,
            merged_selection: RwLock::new(None),
        }
    }

    fn adapter_for(&self, channel: Channel) -> Option<&Arc<dyn ChannelAdapter>> {
        self.adapters.iter().find(|a| a.channel() == channel)
    }

    /// Concatenation of every adapter's conversation list, in adapter order.
    /// No sorting and no de-duplication: conversations are disjoint across
    /// channels under the `(channel, id)` uniqueness invariant.
    pub fn merged_conversations(&self) -> Vec<Conversation> {
        self.adapters
            .iter()
            .flat_map(|adapter| adapter.list_conversations())
            .collect()
    }

    /// Active conversation of one channel's adapter.
    pub fn active_conversation_for(&self, channel: Channel) -> Option<String> {
        self.adapter_for(channel)
            .and_then(|adapter| adapter.active_conversation())
    }

    /// Select a conversation on one channel's adapter, leaving the other
    /// channels' selections untouched.
    pub fn set_active_conversation_for(&self, channel: Channel, id: &str) {
        match self.adapter_for(channel) {
            Some(adapter) => adapter.select_conversation(id),
            None => warn!(%channel, "selection for unregistered channel ignored"),
        }
    }

    /// The merged-view selection, if any.
    pub fn merged_selection(&self) -> Option<(Channel, String)> {
        self.merged_selection
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Set the merged-view selection. Does not touch per-channel selections.
    pub fn set_merged_selection(&self, channel: Channel, id: &str) {
        if let Ok(mut guard) = self.merged_selection.write() {
            *guard = Some((channel, id.to_owned()));
        }
    }

    /// Clear the merged-view selection.
    pub fn clear_merged_selection(&self) {
        if let Ok(mut guard) = self.merged_selection.write() {
            *guard = None;
        }
    }

    /// Route a send to the adapter owning the conversation's channel.
    ///
    /// The conversation is selected on that adapter first (a no-op when
    /// already active), then sent through its `send_text`.
    pub async fn dispatch_send(
        &self,
        conversation: &Conversation,
        text: &str,
    ) -> Result<SendReceipt, DispatchError> {
        let adapter = self
            .adapter_for(conversation.channel)
            .ok_or(DispatchError::UnknownChannel(conversation.channel))?;
        adapter.select_conversation(&conversation.id);
        Ok(adapter.send_text(text).await?)
    }

    /// Refresh every adapter, tolerating per-channel failures. Returns the
    /// total number of conversations fetched.
    pub async fn refresh_all(&self) -> usize {
        let mut total: usize = 0;
        for adapter in &self.adapters {
            match adapter.refresh().await {
                Ok(count) => total = total.saturating_add(count),
                Err(e) => {
                    warn!(channel = %adapter.channel(), error = %e, "conversation refresh failed")
                }
            }
        }
        total
    }
}

//! Identity resolution: raw per-channel conversation records to canonical ids.
//!
//! Each channel declares which field carries its identity by construction:
//! the raw record is a tagged union, so resolution is an exhaustive match
//! instead of a duck-typed fallback chain.

use crate::types::Channel;

/// Display metadata shared by every raw conversation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProfile {
    /// Contact or thread display name.
    pub name: String,
    /// Last-message preview text.
    pub preview: String,
    /// Last activity as epoch seconds, 0 when the provider omits it.
    pub last_activity: i64,
    /// Unread-message counter as reported by the provider.
    pub unread: u32,
}

impl RawProfile {
    /// Profile with a name only; used where the provider sends no metadata.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preview: String::new(),
            last_activity: 0,
            unread: 0,
        }
    }
}

/// Channel-specific raw conversation record, as fetched from a provider.
///
/// Only the personal channel carries multiple candidate identifier fields;
/// the other two channels always have exactly one canonical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawConversationRecord {
    /// Personal-channel record. At most one identifier field is guaranteed
    /// present; several may coexist upstream.
    Personal {
        /// Primary conversation id.
        conversation_id: Option<String>,
        /// Thread id, used when no primary id is present.
        thread_id: Option<String>,
        /// Peer id, the last-resort identifier.
        peer_id: Option<String>,
        /// Display metadata.
        profile: RawProfile,
    },
    /// Official-account record, addressed by the contact's open id.
    OfficialAccount {
        /// Canonical contact identifier on the official-account platform.
        open_id: String,
        /// Display metadata.
        profile: RawProfile,
    },
    /// Page-messaging record, addressed by thread key; sending requires a
    /// separate recipient identifier that may be absent.
    PageMessaging {
        /// Canonical thread identifier.
        thread_key: String,
        /// Provider-specific recipient identifier required for sends.
        recipient_id: Option<String>,
        /// Display metadata.
        profile: RawProfile,
    },
}

impl RawConversationRecord {
    /// Channel this record belongs to.
    pub fn channel(&self) -> Channel {
        match self {
            RawConversationRecord::Personal { .. } => Channel::Personal,
            RawConversationRecord::OfficialAccount { .. } => Channel::OfficialAccount,
            RawConversationRecord::PageMessaging { .. } => Channel::PageMessaging,
        }
    }

    /// Display metadata for this record.
    pub fn profile(&self) -> &RawProfile {
        match self {
            RawConversationRecord::Personal { profile, .. }
            | RawConversationRecord::OfficialAccount { profile, .. }
            | RawConversationRecord::PageMessaging { profile, .. } => profile,
        }
    }

    /// Mutable display metadata for this record.
    pub(crate) fn profile_mut(&mut self) -> &mut RawProfile {
        match self {
            RawConversationRecord::Personal { profile, .. }
            | RawConversationRecord::OfficialAccount { profile, .. }
            | RawConversationRecord::PageMessaging { profile, .. } => profile,
        }
    }

    /// Recipient identifier needed for page-messaging sends; `None` elsewhere.
    pub fn recipient_id(&self) -> Option<&str> {
        match self {
            RawConversationRecord::PageMessaging { recipient_id, .. } => recipient_id.as_deref(),
            _ => None,
        }
    }
}

/// Resolve the canonical conversation identifier for a raw record.
///
/// Personal precedence: conversation id, else thread id, else peer id, else
/// the empty-string sentinel ("no active selection"; callers must not treat
/// it as a real id). When several personal candidates are present, the first
/// in precedence order wins, an upstream ambiguity that is preserved, not
/// reconciled. The other channels resolve to their single canonical field.
pub fn resolve(record: &RawConversationRecord) -> &str {
    match record {
        RawConversationRecord::Personal {
            conversation_id,
            thread_id,
            peer_id,
            ..
        } => conversation_id
            .as_deref()
            .or(thread_id.as_deref())
            .or(peer_id.as_deref())
            .unwrap_or(""),
        RawConversationRecord::OfficialAccount { open_id, .. } => open_id,
        RawConversationRecord::PageMessaging { thread_key, .. } => thread_key,
    }
}

//! Unified conversation model shared by every channel adapter.
//!
//! A conversation is only meaningful as the pair `(channel, id)`: two
//! channels may coincidentally produce the same id string for different
//! conversations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel tag attached to every conversation and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// Individual user's chat account, authenticated via a device-pairing QR scan.
    Personal,
    /// Business-operated channel on the same chat platform.
    OfficialAccount,
    /// Social-network business page's direct-message channel.
    PageMessaging,
}

impl Channel {
    /// Stable string id used in config, logging, and UI channel ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Personal => "personal",
            Channel::OfficialAccount => "official-account",
            Channel::PageMessaging => "page-messaging",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a message, seen from the bridge operator's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The remote contact.
    User,
    /// The operator (this side of the bridge).
    Bot,
}

/// One normalized message.
///
/// `text` is opaque to the bridge: it may carry a serialized rich-content
/// envelope (image, card) that the presentation layer interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned id, or a bridge-generated one when the provider returns none.
    pub id: String,
    /// Message body, treated as an opaque string.
    pub text: String,
    /// Short display label for when the message was sent. Never parsed back.
    pub sent_at_label: String,
    /// Message author.
    pub sender: Sender,
}

/// One unified conversation. Uniqueness key is `(channel, id)`, never `id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Canonical identifier produced by the identity resolver for this channel.
    pub id: String,
    /// Channel this conversation lives on.
    pub channel: Channel,
    /// Contact or thread display name.
    pub display_name: String,
    /// Single uppercase character used as the avatar placeholder.
    pub avatar_initial: String,
    /// Last-message preview shown in conversation lists.
    pub preview_text: String,
    /// Short display label for the last activity. Never parsed back.
    pub last_activity_label: String,
    /// Unread-message counter, local to this bridge session.
    pub unread_count: u32,
    /// Messages loaded for this conversation (populated only when active).
    pub messages: Vec<Message>,
}

/// Format an epoch-seconds timestamp into the short label shown in lists.
///
/// Same-day timestamps render as `HH:MM`, older ones as `MM-DD HH:MM`.
/// Out-of-range timestamps render as an empty label.
pub fn activity_label(epoch_secs: i64) -> String {
    let Some(ts) = DateTime::from_timestamp(epoch_secs, 0) else {
        return String::new();
    };
    if ts.date_naive() == Utc::now().date_naive() {
        ts.format("%H:%M").to_string()
    } else {
        ts.format("%m-%d %H:%M").to_string()
    }
}

/// Uppercase initial for the avatar placeholder, `"?"` when the name is blank.
pub fn avatar_initial(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_owned())
}

//! Thread data model: messages, attachments and embeds as read from the platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of channel a handle points at. Only the `*Thread` kinds hold threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    PublicThread,
    PrivateThread,
    NewsThread,
    Voice,
    Forum,
    Dm,
}

impl ChannelKind {
    /// Whether this channel is a threaded conversation.
    pub fn is_thread(&self) -> bool {
        matches!(
            self,
            Self::PublicThread | Self::PrivateThread | Self::NewsThread
        )
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::PublicThread => write!(f, "public_thread"),
            Self::PrivateThread => write!(f, "private_thread"),
            Self::NewsThread => write!(f, "news_thread"),
            Self::Voice => write!(f, "voice"),
            Self::Forum => write!(f, "forum"),
            Self::Dm => write!(f, "dm"),
        }
    }
}

/// Direction of a history traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    OldestFirst,
    NewestFirst,
}

/// Message author as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    /// Set by the platform for bot / automated accounts.
    #[serde(default)]
    pub bot: bool,
}

/// A file attached to a message. The bytes are read through the channel source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Attachment {
    /// Whether the declared MIME type marks this attachment as plain text.
    pub fn is_plain_text(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("text/plain"))
            .unwrap_or(false)
    }
}

/// One name/value field of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Rich-content embed attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

/// Reaction summary on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    #[serde(default = "default_reaction_count")]
    pub count: u32,
}

fn default_reaction_count() -> u32 {
    1
}

/// Position of a message in history. Ordering is by timestamp, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistoryCursor {
    pub timestamp: DateTime<Utc>,
    pub id: u64,
}

/// An immutable message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn author_is_automated(&self) -> bool {
        self.author.bot
    }

    pub fn cursor(&self) -> HistoryCursor {
        HistoryCursor {
            timestamp: self.timestamp,
            id: self.id,
        }
    }

    pub fn has_reaction(&self, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r.emoji == emoji && r.count > 0)
    }
}

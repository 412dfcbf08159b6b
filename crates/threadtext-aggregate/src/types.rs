//! Aggregation results and errors.

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use threadtext_core::ChannelKind;
use threadtext_docs::FetchError;

/// Guidance shown when a linked document cannot be used.
pub const UNRESOLVABLE_DOCUMENT_GUIDANCE: &str = "Permissions on drive link denied, please check your sharing settings. Could also be an empty drive document.";

/// Shown when a thread-only operation is invoked elsewhere.
pub const NOT_A_THREAD_GUIDANCE: &str = "Sorry, this can only be done in a thread.";

/// Why a linked document could not contribute text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvableReason {
    Denied,
    Empty,
}

impl std::fmt::Display for UnresolvableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied => write!(f, "access denied"),
            Self::Empty => write!(f, "empty document"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Channel {channel_id} is a {kind} channel, not a thread")]
    NotAThread { channel_id: String, kind: ChannelKind },

    #[error("Linked document {url} could not be used ({reason})")]
    UnresolvableDocument {
        url: String,
        reason: UnresolvableReason,
    },

    #[error("Document fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl From<threadtext_core::Error> for AggregationError {
    fn from(e: threadtext_core::Error) -> Self {
        match e {
            threadtext_core::Error::NotAThread { channel_id, kind } => {
                Self::NotAThread { channel_id, kind }
            }
            other => Self::Platform(other.to_string()),
        }
    }
}

impl AggregationError {
    /// Text to show the person who invoked the aggregation.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAThread { .. } => NOT_A_THREAD_GUIDANCE.to_string(),
            Self::UnresolvableDocument { .. } => UNRESOLVABLE_DOCUMENT_GUIDANCE.to_string(),
            Self::Fetch(e) => format!("Could not reach the document host: {}", e),
            Self::Platform(e) => format!("Could not read the thread: {}", e),
        }
    }
}

/// A problem with one message that did not stop the aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageWarning {
    pub message_id: u64,
    pub detail: String,
}

/// Full-text corpus plus what happened while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusReport {
    pub text: String,
    /// Messages read from history.
    pub messages_seen: usize,
    /// Messages that passed the author filter.
    pub messages_used: usize,
    pub warnings: Vec<MessageWarning>,
}

impl CorpusReport {
    /// Hex SHA-256 of the corpus text.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }
}

/// Result of the embed aggregation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EmbedAggregate {
    /// Field names and field values, each concatenated.
    Split { names: String, values: String },
    /// `name + value` per field, concatenated.
    Merged(String),
}

//! Error types for threadtext.

use thiserror::Error;

use crate::model::ChannelKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Channel {channel_id} is a {kind} channel, not a thread")]
    NotAThread { channel_id: String, kind: ChannelKind },

    #[error("Attachment {filename} on message {message_id} is not valid text: {reason}")]
    AttachmentDecode {
        message_id: u64,
        filename: String,
        reason: String,
    },

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

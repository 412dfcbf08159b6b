//! Per-message text extraction. Knows nothing about history or threads.

use threadtext_core::{EmbedField, Error, Message, Result};

use crate::source::ChannelSource;

/// Text of the message's plain-text attachments.
///
/// When several plain-text attachments are present the last one wins;
/// earlier ones are never read. Returns an empty string when there is no
/// plain-text attachment.
pub async fn extract_attachment_text<S: ChannelSource>(
    source: &S,
    message: &Message,
) -> Result<String> {
    let Some(attachment) = message.attachments.iter().rev().find(|a| a.is_plain_text()) else {
        return Ok(String::new());
    };
    let bytes = source.read_attachment(attachment).await?;
    String::from_utf8(bytes).map_err(|e| Error::AttachmentDecode {
        message_id: message.id,
        filename: attachment.filename.clone(),
        reason: e.to_string(),
    })
}

/// Every field of every embed, in embed order then field order.
pub fn extract_embed_fields(message: &Message) -> impl Iterator<Item = &EmbedField> {
    message.embeds.iter().flat_map(|embed| embed.fields.iter())
}

pub fn extract_inline_text(message: &Message) -> &str {
    &message.content
}

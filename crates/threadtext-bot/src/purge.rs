//! Which of the bot's own messages may be removed from a thread.

use futures::StreamExt;
use threadtext_core::{Message, Result};
use threadtext_thread::{ChannelSource, HistoryRequest, ThreadHistoryReader};
use tracing::info;

/// Reaction that marks a bot message as one to keep.
pub const KEEP_REACTION: &str = "✅";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFilter {
    pub bot_user_id: String,
    /// Spare messages carrying the keep reaction.
    pub honor_keep_reaction: bool,
}

impl DeleteFilter {
    /// Filter for deleting one selected message: authorship alone decides.
    pub fn for_single_message(bot_user_id: impl Into<String>) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            honor_keep_reaction: false,
        }
    }

    /// Filter for sweeping a thread: reacted messages are kept.
    pub fn for_purge(bot_user_id: impl Into<String>) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            honor_keep_reaction: true,
        }
    }

    pub fn should_delete(&self, message: &Message) -> bool {
        if message.author.id != self.bot_user_id {
            return false;
        }
        !(self.honor_keep_reaction && message.has_reaction(KEEP_REACTION))
    }
}

/// Ids of the deletable messages among the `limit` newest in the thread.
pub async fn plan_purge<S: ChannelSource>(
    source: &S,
    filter: &DeleteFilter,
    limit: usize,
) -> Result<Vec<u64>> {
    let mut history = ThreadHistoryReader::open(source, HistoryRequest::newest_first(limit))?;
    let mut ids = Vec::new();
    let mut scanned = 0usize;

    while let Some(message) = history.next().await {
        let message = message?;
        scanned += 1;
        if filter.should_delete(&message) {
            ids.push(message.id);
        }
    }

    info!(
        "Purge plan for {}: {} of {} scanned messages",
        source.channel_id(),
        ids.len(),
        scanned
    );
    Ok(ids)
}

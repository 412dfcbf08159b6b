//! The platform seam: a channel that can be paged through and whose
//! attachments can be read.

use std::future::Future;

use threadtext_core::{Attachment, ChannelKind, HistoryCursor, HistoryOrder, Message, Result};

/// One page request against a channel's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub order: HistoryOrder,
    /// Return only messages strictly past this position in `order`.
    pub after: Option<HistoryCursor>,
    /// Maximum number of messages to return.
    pub limit: usize,
}

/// A channel on the messaging platform.
pub trait ChannelSource: Send + Sync {
    fn channel_id(&self) -> &str;

    fn kind(&self) -> ChannelKind;

    /// Fetch up to `query.limit` messages in `query.order`, starting after
    /// `query.after`. A short page means history is exhausted.
    fn fetch_page(&self, query: PageQuery) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Read the raw bytes of an attachment.
    fn read_attachment(
        &self,
        attachment: &Attachment,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

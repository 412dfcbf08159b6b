//! Lazy, paginated traversal of a thread's history.

use std::pin::Pin;

use futures::Stream;
use threadtext_core::config::DEFAULT_HISTORY_PAGE_SIZE;
use threadtext_core::{Error, HistoryOrder, Message, Result};
use tracing::debug;

use crate::source::{ChannelSource, PageQuery};

/// Boxed stream of messages borrowed from a channel source.
pub type MessageStream<'a> = Pin<Box<dyn Stream<Item = Result<Message>> + Send + 'a>>;

/// What to traverse: direction, total cap, and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub order: HistoryOrder,
    /// `None` walks the whole history.
    pub limit: Option<usize>,
    pub page_size: usize,
}

impl HistoryRequest {
    /// Whole history, oldest message first.
    pub fn oldest_first() -> Self {
        Self {
            order: HistoryOrder::OldestFirst,
            limit: None,
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }

    /// The `limit` most recent messages, newest first.
    pub fn newest_first(limit: usize) -> Self {
        Self {
            order: HistoryOrder::NewestFirst,
            limit: Some(limit),
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Opens history traversals over thread-shaped channels.
pub struct ThreadHistoryReader;

impl ThreadHistoryReader {
    /// Fail with `Error::NotAThread` unless `source` is a thread.
    pub fn ensure_thread<S: ChannelSource>(source: &S) -> Result<()> {
        let kind = source.kind();
        if kind.is_thread() {
            Ok(())
        } else {
            Err(Error::NotAThread {
                channel_id: source.channel_id().to_string(),
                kind,
            })
        }
    }

    /// Open a fresh traversal. Pages are fetched only as the stream is polled.
    pub fn open<'a, S>(source: &'a S, request: HistoryRequest) -> Result<MessageStream<'a>>
    where
        S: ChannelSource + 'a,
    {
        Self::ensure_thread(source)?;

        let page_size = request.page_size.max(1);
        let order = request.order;
        let channel_id = source.channel_id().to_string();

        let stream = async_stream::stream! {
            let mut after = None;
            let mut remaining = request.limit;

            loop {
                let want = match remaining {
                    Some(0) => break,
                    Some(n) => n.min(page_size),
                    None => page_size,
                };

                let page = match source.fetch_page(PageQuery { order, after, limit: want }).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };
                let fetched = page.len().min(want);
                debug!("History page for {}: {} messages", channel_id, fetched);

                for message in page.into_iter().take(want) {
                    after = Some(message.cursor());
                    yield Ok(message);
                }

                if let Some(n) = remaining.as_mut() {
                    *n -= fetched;
                }
                if fetched < want {
                    break;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

//! Aggregation orchestrator: history, then extraction and fetching, then policy, into a corpus.

use futures::StreamExt;
use threadtext_core::config::{DEFAULT_EMBED_SCAN_LIMIT, DEFAULT_HISTORY_PAGE_SIZE};
use threadtext_core::{Error, HistoryOrder, Message};
use threadtext_docs::{find_document_links, DocumentFetcher, FetchResult};
use threadtext_thread::{
    extract_attachment_text, extract_embed_fields, extract_inline_text, ChannelSource,
    HistoryRequest, ThreadHistoryReader,
};
use tracing::{debug, info, warn};

use crate::policy::AggregationPolicy;
use crate::types::{
    AggregationError, CorpusReport, EmbedAggregate, MessageWarning, UnresolvableReason,
};

/// Options for the full-text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullTextOptions {
    pub include_automated_authors: bool,
    pub order: HistoryOrder,
    /// `None` reads the whole thread.
    pub limit: Option<usize>,
}

impl Default for FullTextOptions {
    fn default() -> Self {
        Self {
            include_automated_authors: false,
            order: HistoryOrder::OldestFirst,
            limit: None,
        }
    }
}

/// Options for the embed mode. Defaults differ from the full-text mode:
/// automated authors are included and only the newest messages are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub split_fields: bool,
    pub include_automated_authors: bool,
    pub order: HistoryOrder,
    pub limit: Option<usize>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            split_fields: true,
            include_automated_authors: true,
            order: HistoryOrder::NewestFirst,
            limit: Some(DEFAULT_EMBED_SCAN_LIMIT),
        }
    }
}

/// Builds corpora from threads. Each call owns its own accumulating output.
pub struct TextAggregator<F> {
    fetcher: F,
    page_size: usize,
}

impl<F> TextAggregator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Collect embed field names and values from the thread.
    pub async fn aggregate_embed_text<S: ChannelSource>(
        &self,
        thread: &S,
        options: EmbedOptions,
    ) -> Result<EmbedAggregate, AggregationError> {
        let policy = AggregationPolicy::new(options.include_automated_authors);
        let request = HistoryRequest {
            order: options.order,
            limit: options.limit,
            page_size: self.page_size,
        };
        let mut history = ThreadHistoryReader::open(thread, request)?;

        let mut names = String::new();
        let mut values = String::new();
        let mut merged = String::new();
        let mut field_count = 0usize;

        while let Some(message) = history.next().await {
            let message = message?;
            if !policy.should_process(&message) {
                continue;
            }
            for field in extract_embed_fields(&message) {
                names.push_str(&field.name);
                values.push_str(&field.value);
                merged.push_str(&field.name);
                merged.push_str(&field.value);
                field_count += 1;
            }
        }

        info!(
            "Embed aggregation for {}: {} fields",
            thread.channel_id(),
            field_count
        );

        Ok(if options.split_fields {
            EmbedAggregate::Split { names, values }
        } else {
            EmbedAggregate::Merged(merged)
        })
    }
}

impl<F: DocumentFetcher> TextAggregator<F> {
    /// Build the thread's text corpus.
    pub async fn aggregate_full_text<S: ChannelSource>(
        &self,
        thread: &S,
        options: FullTextOptions,
    ) -> Result<String, AggregationError> {
        self.aggregate_full_text_report(thread, options)
            .await
            .map(|report| report.text)
    }

    /// Build the thread's text corpus along with per-message warnings.
    ///
    /// Any linked document that is denied or empty aborts the whole build.
    pub async fn aggregate_full_text_report<S: ChannelSource>(
        &self,
        thread: &S,
        options: FullTextOptions,
    ) -> Result<CorpusReport, AggregationError> {
        let policy = AggregationPolicy::new(options.include_automated_authors);
        let request = HistoryRequest {
            order: options.order,
            limit: options.limit,
            page_size: self.page_size,
        };
        let mut history = ThreadHistoryReader::open(thread, request)?;
        let mut report = CorpusReport::default();

        while let Some(message) = history.next().await {
            let message = message?;
            report.messages_seen += 1;
            if !policy.should_process(&message) {
                continue;
            }
            report.messages_used += 1;

            let attachment_text = match extract_attachment_text(thread, &message).await {
                Ok(text) => text,
                Err(e @ Error::AttachmentDecode { .. }) => {
                    warn!("Skipping attachment text of message {}: {}", message.id, e);
                    report.warnings.push(MessageWarning {
                        message_id: message.id,
                        detail: e.to_string(),
                    });
                    String::new()
                }
                Err(e) => return Err(e.into()),
            };

            let document_text = if AggregationPolicy::needs_document_resolution(&attachment_text) {
                self.resolve_documents(&message).await?
            } else {
                String::new()
            };

            AggregationPolicy::select(attachment_text, document_text, extract_inline_text(&message))
                .append_to(&mut report.text);
        }

        info!(
            "Full-text aggregation for {}: {} of {} messages, {} chars, {} warnings",
            thread.channel_id(),
            report.messages_used,
            report.messages_seen,
            report.text.len(),
            report.warnings.len()
        );

        Ok(report)
    }

    /// Fetch every linked document in the message, concatenated in link order.
    async fn resolve_documents(&self, message: &Message) -> Result<String, AggregationError> {
        let mut text = String::new();
        for link in find_document_links(&message.content) {
            debug!("Message {} links document {}", message.id, link.document_id);
            let reason = match self.fetcher.fetch(&link).await? {
                FetchResult::Text(body) if !body.is_empty() => {
                    text.push_str(&body);
                    continue;
                }
                FetchResult::Text(_) => UnresolvableReason::Empty,
                FetchResult::Denied => UnresolvableReason::Denied,
            };
            warn!(
                "Aborting aggregation: document {} in message {} is unusable ({})",
                link.document_id, message.id, reason
            );
            return Err(AggregationError::UnresolvableDocument {
                url: link.url,
                reason,
            });
        }
        Ok(text)
    }
}

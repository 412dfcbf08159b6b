//! Command handlers. Each one checks its capability, runs the pipeline and
//! reports back through the responder.

use thiserror::Error;
use threadtext_aggregate::{
    EmbedAggregate, EmbedOptions, FullTextOptions, TextAggregator,
};
use threadtext_core::{Capability, ThreadTextConfig};
use threadtext_docs::DocumentFetcher;
use threadtext_thread::{ChannelSource, MemoryThread};
use tracing::{debug, info};

use crate::purge::{plan_purge, DeleteFilter};
use crate::responder::{deliver_text, respond_and_log, DeliveryError, ResponseOptions, Responder};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] threadtext_core::Error),

    #[error("Reply failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// How a command ended. A refusal has already been explained to the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Refused(String),
}

pub struct Bot<R, F> {
    config: ThreadTextConfig,
    responder: R,
    aggregator: TextAggregator<F>,
}

impl<R: Responder, F> Bot<R, F> {
    pub fn new(config: ThreadTextConfig, responder: R, fetcher: F) -> Self {
        let aggregator = TextAggregator::new(fetcher).with_page_size(config.history_page_size);
        Self {
            config,
            responder,
            aggregator,
        }
    }

    pub fn config(&self) -> &ThreadTextConfig {
        &self.config
    }

    pub fn into_responder(self) -> R {
        self.responder
    }

    /// Send a short reply, or only log it when responding is switched off.
    async fn reply(&self, text: &str) -> Result<(), CommandError> {
        if self.config.capabilities.has(Capability::Respond) {
            let handle = respond_and_log(&self.responder, text, ResponseOptions::default()).await?;
            debug!("Reply {} sent", handle.id);
        } else {
            info!("{}", text);
        }
        Ok(())
    }

    /// Send text of any length; long text goes out as the attachment `filename`.
    async fn reply_text(&self, text: &str, filename: &str) -> Result<(), CommandError> {
        if self.config.capabilities.has(Capability::Respond) {
            let handle =
                deliver_text(&self.responder, text, self.config.max_message_chars, filename)
                    .await?;
            debug!("Reply {} sent", handle.id);
        } else {
            info!("{}", text);
        }
        Ok(())
    }

    async fn refuse(&self, message: String) -> Result<Outcome, CommandError> {
        self.reply(&message).await?;
        Ok(Outcome::Refused(message))
    }

    /// Reply with the thread's embed field names and values. Both shapes read
    /// the same newest messages.
    pub async fn embeds<S: ChannelSource>(
        &self,
        thread: &S,
        merged: bool,
        exclude_bots: bool,
    ) -> Result<Outcome, CommandError> {
        self.config.capabilities.require(Capability::Text)?;
        let options = EmbedOptions {
            split_fields: !merged,
            include_automated_authors: !exclude_bots,
            limit: Some(self.config.embed_scan_limit),
            ..EmbedOptions::default()
        };

        match self.aggregator.aggregate_embed_text(thread, options).await {
            Ok(EmbedAggregate::Split { names, values }) => {
                if names.is_empty() && values.is_empty() {
                    self.reply("No embed fields found in this thread.").await?;
                } else {
                    self.reply_text(&names, "embed_names.txt").await?;
                    self.reply_text(&values, "embed_values.txt").await?;
                }
                Ok(Outcome::Completed)
            }
            Ok(EmbedAggregate::Merged(text)) => {
                if text.is_empty() {
                    self.reply("No embed fields found in this thread.").await?;
                } else {
                    self.reply_text(&text, "embeds.txt").await?;
                }
                Ok(Outcome::Completed)
            }
            Err(e) => self.refuse(e.user_message()).await,
        }
    }

    /// Delete the bot's own messages from the newest part of the thread,
    /// sparing any marked with the keep reaction.
    pub async fn purge(
        &self,
        thread: &MemoryThread,
        bot_user_id: &str,
        invoker: &str,
    ) -> Result<Outcome, CommandError> {
        self.config.capabilities.require(Capability::Delete)?;
        let filter = DeleteFilter::for_purge(bot_user_id);

        let ids = match plan_purge(thread, &filter, self.config.purge_scan_limit).await {
            Ok(ids) => ids,
            Err(threadtext_core::Error::NotAThread { .. }) => {
                return self
                    .refuse(format!("Sorry {}, this can only be done in a thread.", invoker))
                    .await;
            }
            Err(e) => return Err(e.into()),
        };

        let removed = thread.delete_messages(&ids);
        info!("Purged {} messages from {}", removed, thread.channel_id());
        self.reply(&format!("Deleted {} messages.", removed)).await?;
        Ok(Outcome::Completed)
    }

    /// Delete one selected message if the bot wrote it.
    pub async fn delete(
        &self,
        thread: &MemoryThread,
        message_id: u64,
        bot_user_id: &str,
        invoker: &str,
    ) -> Result<Outcome, CommandError> {
        self.config.capabilities.require(Capability::Delete)?;
        let filter = DeleteFilter::for_single_message(bot_user_id);

        let deletable = thread
            .get(message_id)
            .map_or(false, |message| filter.should_delete(&message));
        if !deletable {
            return self
                .refuse(format!("Sorry {}, this message can't be deleted.", invoker))
                .await;
        }

        thread.delete_messages(&[message_id]);
        self.reply("Message deleted.").await?;
        Ok(Outcome::Completed)
    }
}

impl<R: Responder, F: DocumentFetcher> Bot<R, F> {
    /// Reply with the thread's aggregated text.
    pub async fn thread_text<S: ChannelSource>(
        &self,
        thread: &S,
        include_bots: bool,
    ) -> Result<Outcome, CommandError> {
        self.config.capabilities.require(Capability::Text)?;
        let options = FullTextOptions {
            include_automated_authors: include_bots,
            ..Default::default()
        };

        let report = match self.aggregator.aggregate_full_text_report(thread, options).await {
            Ok(report) => report,
            Err(e) => return self.refuse(e.user_message()).await,
        };

        info!(
            "Corpus for {}: sha256 {}",
            thread.channel_id(),
            report.digest()
        );
        for warning in &report.warnings {
            self.reply(&format!(
                "Skipped the attachment of message {}: {}",
                warning.message_id, warning.detail
            ))
            .await?;
        }

        if report.text.is_empty() {
            self.reply("No text found in this thread.").await?;
        } else {
            self.reply_text(&report.text, "thread.txt").await?;
        }
        Ok(Outcome::Completed)
    }
}

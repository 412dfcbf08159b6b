//! Per-message decisions: whether a message counts, and which of its text
//! sources wins.

use threadtext_core::Message;

/// The single text block a message contributes to the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contribution {
    Attachment(String),
    Document(String),
    Inline(String),
}

impl Contribution {
    /// Append to the corpus. Only inline text is followed by a line separator.
    pub fn append_to(&self, corpus: &mut String) {
        match self {
            Self::Attachment(text) | Self::Document(text) => corpus.push_str(text),
            Self::Inline(text) => {
                corpus.push_str(text);
                corpus.push('\n');
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationPolicy {
    pub include_automated_authors: bool,
}

impl AggregationPolicy {
    pub fn new(include_automated_authors: bool) -> Self {
        Self {
            include_automated_authors,
        }
    }

    /// Whether the message takes part in the aggregation at all.
    pub fn should_process(&self, message: &Message) -> bool {
        !message.author_is_automated() || self.include_automated_authors
    }

    /// Linked documents are only consulted when there is no attachment text.
    pub fn needs_document_resolution(attachment_text: &str) -> bool {
        attachment_text.is_empty()
    }

    /// Attachment text beats document text, which beats inline text.
    pub fn select(attachment_text: String, document_text: String, inline_text: &str) -> Contribution {
        if !attachment_text.is_empty() {
            Contribution::Attachment(attachment_text)
        } else if !document_text.is_empty() {
            Contribution::Document(document_text)
        } else {
            Contribution::Inline(inline_text.to_string())
        }
    }
}

//! Document link discovery in free text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// The id is the path segment following `/document/d/`.
static DOC_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://docs\.google\.com/document/d/([A-Za-z0-9_-]+)[^\s]*").unwrap()
});

/// A document referenced by a sharing link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDocumentReference {
    pub document_id: String,
    /// The full link as it appeared in the message.
    pub url: String,
}

/// Find every document link in `text`, in order, duplicates included.
pub fn find_document_links(text: &str) -> Vec<LinkedDocumentReference> {
    DOC_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let url = caps.get(0)?.as_str();
            let id = caps.get(1)?.as_str();
            Some(LinkedDocumentReference {
                document_id: id.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

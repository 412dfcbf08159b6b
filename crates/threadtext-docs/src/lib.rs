//! Linked documents: finding document-sharing links in message text and
//! resolving them to their plain-text export.
//!
//! `HttpDocumentFetcher` infers "denied or not a real document" from the
//! `X-Frame-Options: DENY` header on the export response; transport failures
//! are reported separately as `FetchError`.

pub mod fetcher;
pub mod links;

pub use fetcher::{DocumentFetcher, FetchError, FetchResult, HttpDocumentFetcher};
pub use links::{find_document_links, LinkedDocumentReference};

//! Thread text aggregation.
//!
//! `TextAggregator` walks a thread through the `AggregationPolicy`, pulling
//! attachment text, linked-document text, or inline text for each message
//! into a single corpus. The embed mode collects embed field names and
//! values instead.

pub mod aggregator;
pub mod policy;
pub mod types;

pub use aggregator::{EmbedOptions, FullTextOptions, TextAggregator};
pub use policy::{AggregationPolicy, Contribution};
pub use types::*;

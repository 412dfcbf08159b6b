//! Thread access: paginated history traversal over a `ChannelSource`,
//! per-message text extraction, and an in-memory thread export.

pub mod extract;
pub mod history;
pub mod memory;
pub mod source;

pub use extract::{extract_attachment_text, extract_embed_fields, extract_inline_text};
pub use history::{HistoryRequest, MessageStream, ThreadHistoryReader};
pub use memory::{MemoryThread, ThreadExport};
pub use source::{ChannelSource, PageQuery};

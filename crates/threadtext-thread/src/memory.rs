//! In-memory thread backed by a JSON thread export.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use threadtext_core::{Attachment, ChannelKind, Error, HistoryOrder, Message, Result};
use tracing::info;

use crate::source::{ChannelSource, PageQuery};

/// On-disk shape of an exported thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadExport {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Attachment id → attachment text.
    #[serde(default)]
    pub attachment_bodies: HashMap<String, String>,
}

/// A channel held entirely in memory. Messages are kept in history order.
pub struct MemoryThread {
    id: String,
    name: String,
    kind: ChannelKind,
    messages: RwLock<Vec<Message>>,
    bodies: RwLock<HashMap<String, Vec<u8>>>,
    pages_served: AtomicUsize,
}

impl MemoryThread {
    pub fn new(id: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            messages: RwLock::new(Vec::new()),
            bodies: RwLock::new(HashMap::new()),
            pages_served: AtomicUsize::new(0),
        }
    }

    pub fn from_export(export: ThreadExport) -> Self {
        let mut thread = Self::new(export.id, export.kind);
        thread.name = export.name;
        for message in export.messages {
            thread.push_message(message);
        }
        thread.bodies = RwLock::new(
            export
                .attachment_bodies
                .into_iter()
                .map(|(id, text)| (id, text.into_bytes()))
                .collect(),
        );
        thread
    }

    /// Load a thread export from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let export: ThreadExport = serde_json::from_str(&raw)?;
        let thread = Self::from_export(export);
        info!(
            "Loaded thread {} ({}) with {} messages",
            thread.id,
            thread.kind,
            thread.len()
        );
        Ok(thread)
    }

    pub fn to_export(&self) -> ThreadExport {
        ThreadExport {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            messages: self.messages.read().clone(),
            attachment_bodies: self
                .bodies
                .read()
                .iter()
                .map(|(id, bytes)| (id.clone(), String::from_utf8_lossy(bytes).into_owned()))
                .collect(),
        }
    }

    /// Write the thread back out as a JSON export.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.to_export())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a message at its history position.
    pub fn push_message(&self, message: Message) {
        let mut messages = self.messages.write();
        let cursor = message.cursor();
        let pos = messages.partition_point(|m| m.cursor() < cursor);
        messages.insert(pos, message);
    }

    pub fn with_message(self, message: Message) -> Self {
        self.push_message(message);
        self
    }

    pub fn set_attachment_body(&self, attachment_id: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.bodies.write().insert(attachment_id.into(), bytes.into());
    }

    pub fn with_attachment_body(
        self,
        attachment_id: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.set_attachment_body(attachment_id, bytes);
        self
    }

    /// Remove messages by id. Returns how many were removed.
    pub fn delete_messages(&self, ids: &[u64]) -> usize {
        let mut messages = self.messages.write();
        let before = messages.len();
        messages.retain(|m| !ids.contains(&m.id));
        before - messages.len()
    }

    pub fn get(&self, id: u64) -> Option<Message> {
        self.messages.read().iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of history pages served so far.
    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::Relaxed)
    }
}

impl ChannelSource for MemoryThread {
    fn channel_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn fetch_page(&self, query: PageQuery) -> Result<Vec<Message>> {
        self.pages_served.fetch_add(1, Ordering::Relaxed);
        let page = {
            let messages = self.messages.read();
            match query.order {
                HistoryOrder::OldestFirst => messages
                    .iter()
                    .filter(|m| query.after.map_or(true, |c| m.cursor() > c))
                    .take(query.limit)
                    .cloned()
                    .collect(),
                HistoryOrder::NewestFirst => messages
                    .iter()
                    .rev()
                    .filter(|m| query.after.map_or(true, |c| m.cursor() < c))
                    .take(query.limit)
                    .cloned()
                    .collect(),
            }
        };
        Ok(page)
    }

    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        self.bodies
            .read()
            .get(&attachment.id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("attachment {}", attachment.id)))
    }
}

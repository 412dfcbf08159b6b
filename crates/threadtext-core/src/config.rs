//! Configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::BotCapabilities;
use crate::error::{Error, Result};

pub const DEFAULT_DOCS_BASE_URL: &str = "https://docs.google.com";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 100;
pub const DEFAULT_EMBED_SCAN_LIMIT: usize = 1000;
pub const DEFAULT_PURGE_SCAN_LIMIT: usize = 1000;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 2000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// Top-level threadtext configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadTextConfig {
    /// Document host the export URL is built against.
    pub docs_base_url: String,
    /// Per-request timeout for document exports, in seconds.
    pub fetch_timeout_secs: u64,
    /// Messages requested per history page.
    pub history_page_size: usize,
    /// Cap on messages scanned in embed mode.
    pub embed_scan_limit: usize,
    /// Cap on messages scanned when planning a purge.
    pub purge_scan_limit: usize,
    /// Longest reply the platform accepts inline.
    pub max_message_chars: usize,
    /// Largest file the platform accepts as an upload.
    pub max_upload_bytes: u64,
    /// Where the console responder writes outgoing files.
    pub output_dir: PathBuf,
    pub capabilities: BotCapabilities,
}

impl Default for ThreadTextConfig {
    fn default() -> Self {
        Self {
            docs_base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
            embed_scan_limit: DEFAULT_EMBED_SCAN_LIMIT,
            purge_scan_limit: DEFAULT_PURGE_SCAN_LIMIT,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            output_dir: PathBuf::from("out"),
            capabilities: BotCapabilities::all(),
        }
    }
}

impl ThreadTextConfig {
    /// Create configuration from `THREADTEXT_*` environment variables and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let capabilities = match lookup("THREADTEXT_CAPABILITIES") {
            Some(list) => BotCapabilities::parse_list(&list)?,
            None => defaults.capabilities,
        };

        let config = Self {
            docs_base_url: lookup("THREADTEXT_DOCS_BASE_URL").unwrap_or(defaults.docs_base_url),
            fetch_timeout_secs: parse_var(
                &lookup,
                "THREADTEXT_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout_secs,
            )?,
            history_page_size: parse_var(
                &lookup,
                "THREADTEXT_HISTORY_PAGE_SIZE",
                defaults.history_page_size,
            )?,
            embed_scan_limit: parse_var(
                &lookup,
                "THREADTEXT_EMBED_SCAN_LIMIT",
                defaults.embed_scan_limit,
            )?,
            purge_scan_limit: parse_var(
                &lookup,
                "THREADTEXT_PURGE_SCAN_LIMIT",
                defaults.purge_scan_limit,
            )?,
            max_message_chars: parse_var(
                &lookup,
                "THREADTEXT_MAX_MESSAGE_CHARS",
                defaults.max_message_chars,
            )?,
            max_upload_bytes: parse_var(
                &lookup,
                "THREADTEXT_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
            output_dir: lookup("THREADTEXT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            capabilities,
        };

        if config.history_page_size == 0 {
            return Err(Error::Config(
                "THREADTEXT_HISTORY_PAGE_SIZE must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

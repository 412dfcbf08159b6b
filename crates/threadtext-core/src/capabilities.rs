//! Host capabilities a deployment can switch on or off.
//!
//! A bot instance is composed from independent capabilities rather than
//! per-deployment copies of the same command set.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single host capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Reply to the invoker and log what was sent.
    Respond,
    /// Remove the bot's own messages from a thread.
    Delete,
    /// Thread text and embed aggregation.
    Text,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Respond => write!(f, "respond"),
            Self::Delete => write!(f, "delete"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "respond" => Ok(Self::Respond),
            "delete" => Ok(Self::Delete),
            "text" => Ok(Self::Text),
            other => Err(Error::Config(format!("unknown capability: {}", other))),
        }
    }
}

/// Which capabilities this bot instance has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCapabilities {
    pub respond_and_log: bool,
    pub delete_filtering: bool,
    pub text_aggregation: bool,
}

impl Default for BotCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl BotCapabilities {
    pub fn all() -> Self {
        Self {
            respond_and_log: true,
            delete_filtering: true,
            text_aggregation: true,
        }
    }

    pub fn none() -> Self {
        Self {
            respond_and_log: false,
            delete_filtering: false,
            text_aggregation: false,
        }
    }

    /// Parse a comma-separated list such as `"respond,text"`.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut caps = Self::none();
        for item in list.split(',').filter(|s| !s.trim().is_empty()) {
            caps = caps.with(item.parse()?);
        }
        Ok(caps)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Respond => self.respond_and_log = true,
            Capability::Delete => self.delete_filtering = true,
            Capability::Text => self.text_aggregation = true,
        }
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Respond => self.respond_and_log,
            Capability::Delete => self.delete_filtering,
            Capability::Text => self.text_aggregation,
        }
    }

    /// Fail with a configuration error when `capability` is disabled.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "capability '{}' is not enabled for this bot",
                capability
            )))
        }
    }
}

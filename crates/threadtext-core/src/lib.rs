//! threadtext core: the thread data model, errors, configuration and capabilities.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod model;

pub use capabilities::{BotCapabilities, Capability};
pub use config::ThreadTextConfig;
pub use error::{Error, Result};
pub use model::*;

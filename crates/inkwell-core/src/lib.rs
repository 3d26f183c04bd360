//! Inkwell core: canonical chat types and the collaborators around them.
//!
//! - [`types`]: vendor-neutral `Message` / `Conversation`
//! - [`history`]: bounded `HistoryStore` plus the JSON history file
//! - [`config`]: config schema, loader, env overrides
//! - [`export`]: plain-text export of conversations
//! - [`prompts`]: built-in prompts and the flat-file prompt catalog

pub mod config;
pub mod export;
pub mod history;
pub mod prompts;
pub mod types;
pub mod utils;

pub use history::{HistoryRepository, HistoryStore, JsonHistoryFile};
pub use prompts::PromptCatalog;
pub use types::{Conversation, Message, Role, DEFAULT_TOPIC, ERROR_PREFIX};

//! Canonical message types shared by every provider family.
//!
//! Each vendor adapter consumes and produces these; nothing vendor-specific
//! leaks past the providers crate.

use serde::{Deserialize, Serialize};

/// Topic sentinel for a conversation that has not been named yet.
pub const DEFAULT_TOPIC: &str = "new conversation";

/// Prefix marking an assistant message that records a failed turn.
pub const ERROR_PREFIX: &str = "Error: ";

/// Upper bound on topic length, in characters.
pub const MAX_TOPIC_CHARS: usize = 30;

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Speaker of a canonical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A vendor-neutral chat message: `{"role": ..., "content": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create the assistant message recorded for a failed turn.
    pub fn failure(description: impl std::fmt::Display) -> Self {
        Message::assistant(format!("{ERROR_PREFIX}{description}"))
    }

    /// Whether this message records a failed turn.
    pub fn is_failure(&self) -> bool {
        self.content.starts_with(ERROR_PREFIX)
    }
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

fn default_prompt_id() -> String {
    crate::prompts::DEFAULT_PROMPT_ID.to_string()
}

/// A flushed conversation as stored in history.
///
/// `messages` never contains the leading system message; it is rebuilt from
/// `prompt_id` when the conversation is reopened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub topic: String,
    #[serde(default = "default_prompt_id")]
    pub prompt_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(topic: impl Into<String>, prompt_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Conversation {
            topic: topic.into(),
            prompt_id: prompt_id.into(),
            messages,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

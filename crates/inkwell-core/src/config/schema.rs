//! Configuration schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! Every field has a default so partial files load cleanly.

use serde::{Deserialize, Serialize};

/// Floor applied to `tokenLimit`.
pub const MIN_TOKEN_LIMIT: u32 = 1000;

/// Root configuration: loaded from `~/.inkwell/config.json` + env vars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Provider id from the registry (e.g. `"openai"`).
    pub provider: String,
    /// Model name; unknown names resolve to the provider's first model.
    pub model: String,
    /// API key for the provider.
    pub api_key: String,
    /// One or more hosts separated by `;`. Empty = the registry's hosts.
    pub api_host: String,
    /// Context budget in tokens (at least [`MIN_TOKEN_LIMIT`]).
    pub token_limit: u32,
    /// Number of past conversations kept. 0 disables history.
    pub max_history: usize,
    /// Multi-turn message arrays or one synthesized single message.
    pub chat_mode: ChatMode,
    /// Prompt selection: `"default"`, `"custom"`, or a catalog preset name.
    pub prompt: String,
    /// Custom system prompt text; takes precedence when non-empty.
    pub custom_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            api_host: String::new(),
            token_limit: 4000,
            max_history: 10,
            chat_mode: ChatMode::MultiTurn,
            prompt: crate::prompts::DEFAULT_PROMPT_ID.to_string(),
            custom_prompt: String::new(),
        }
    }
}

impl Config {
    /// Configured hosts, split on `;`, trimmed, empties dropped.
    pub fn hosts(&self) -> Vec<String> {
        self.api_host
            .split(';')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether an API key is set.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Clamp values that have a floor.
    pub fn normalize(mut self) -> Self {
        if self.token_limit < MIN_TOKEN_LIMIT {
            self.token_limit = MIN_TOKEN_LIMIT;
        }
        self.provider = self.provider.trim().to_lowercase();
        self
    }
}

/// How the conversation is sent to OpenAI-compatible backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    #[default]
    MultiTurn,
    SingleTurn,
}

impl ChatMode {
    pub fn is_single_turn(&self) -> bool {
        matches!(self, ChatMode::SingleTurn)
    }
}

impl std::str::FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "multi_turn" | "multi" => Ok(ChatMode::MultiTurn),
            "single_turn" | "single" => Ok(ChatMode::SingleTurn),
            other => Err(format!("unknown chat mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_split() {
        let config = Config {
            api_host: " a.example.com ;b.example.com;; ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.hosts(), vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_hosts_empty() {
        assert!(Config::default().hosts().is_empty());
    }

    #[test]
    fn test_normalize_floors_token_limit() {
        let config = Config {
            token_limit: 10,
            provider: " OpenAI ".to_string(),
            ..Default::default()
        }
        .normalize();
        assert_eq!(config.token_limit, MIN_TOKEN_LIMIT);
        assert_eq!(config.provider, "openai");
    }

    #[test]
    fn test_chat_mode_serde() {
        let json = serde_json::to_value(ChatMode::SingleTurn).unwrap();
        assert_eq!(json, "single_turn");
        let mode: ChatMode = serde_json::from_value(serde_json::json!("multi_turn")).unwrap();
        assert_eq!(mode, ChatMode::MultiTurn);
    }

    #[test]
    fn test_chat_mode_from_str() {
        assert_eq!("single-turn".parse::<ChatMode>(), Ok(ChatMode::SingleTurn));
        assert!("both".parse::<ChatMode>().is_err());
    }
}

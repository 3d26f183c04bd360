//! Provider registry: static catalog of supported vendors.
//!
//! Each `ProviderDescriptor` names the vendor, its default hosts, the wire
//! protocol family it speaks, and its models in preference order (the first
//! model is the default). Rate limits are free-tier figures.

use crate::error::ChatError;

// ─────────────────────────────────────────────
// Descriptors
// ─────────────────────────────────────────────

/// Wire protocol shape a vendor speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolFamily {
    /// `{"model", "messages": [...]}` → `choices[0].message.content`.
    OpenAiCompatible,
    /// One concatenated `Human:`/`Assistant:` prompt → `completion`.
    LegacyCompletion,
    /// `contents[{role, parts[{text}]}]` → `candidates[0].content.parts[0].text`.
    StructuredTurn,
    /// Status call for a one-shot token, then a streamed chat call.
    HandshakeToken,
}

/// One model offered by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub requests_per_minute: u32,
    pub context_tokens: u32,
}

impl ModelSpec {
    const fn new(name: &'static str, requests_per_minute: u32, context_tokens: u32) -> Self {
        ModelSpec {
            name,
            requests_per_minute,
            context_tokens,
        }
    }

    /// Apply the floors used at session time: rpm 0 → 2, context < 4000 → 4000.
    pub fn clamped(mut self) -> Self {
        if self.requests_per_minute == 0 {
            self.requests_per_minute = 2;
        }
        if self.context_tokens < 4000 {
            self.context_tokens = 4000;
        }
        self
    }
}

/// Static description of one vendor.
#[derive(Clone, Debug)]
pub struct ProviderDescriptor {
    /// Registry id used in config (e.g. `"openai"`).
    pub id: &'static str,
    /// Human-readable name for logs and status output.
    pub display_name: &'static str,
    /// Default hosts, tried round-robin when the config names none.
    pub hosts: &'static [&'static str],
    /// Wire protocol family.
    pub family: ProtocolFamily,
    /// Chat path for the OpenAI-compatible family. Other families build their own.
    pub chat_path: &'static str,
    /// Models in preference order.
    pub models: &'static [ModelSpec],
}

const OPENAI_CHAT_PATH: &str = "/v1/chat/completions";

/// All supported providers.
pub static PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        id: "google",
        display_name: "Google Gemini",
        hosts: &["generativelanguage.googleapis.com"],
        family: ProtocolFamily::StructuredTurn,
        chat_path: "",
        models: &[
            ModelSpec::new("gemini-1.5-flash", 15, 128_000),
            ModelSpec::new("gemini-1.5-flash-8b", 15, 128_000),
            ModelSpec::new("gemini-1.5-pro", 2, 128_000),
        ],
    },
    ProviderDescriptor {
        id: "openai",
        display_name: "OpenAI",
        hosts: &["api.openai.com"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: OPENAI_CHAT_PATH,
        models: &[
            ModelSpec::new("gpt-4o-mini", 3, 128_000),
            ModelSpec::new("gpt-4o", 3, 128_000),
            ModelSpec::new("gpt-4-turbo", 3, 128_000),
            ModelSpec::new("gpt-3.5-turbo", 3, 16_000),
        ],
    },
    ProviderDescriptor {
        id: "anthropic",
        display_name: "Anthropic",
        hosts: &["api.anthropic.com"],
        family: ProtocolFamily::LegacyCompletion,
        chat_path: "/v1/complete",
        models: &[
            ModelSpec::new("claude-2", 5, 100_000),
            ModelSpec::new("claude-2.1", 5, 100_000),
            ModelSpec::new("claude-instant-1.2", 5, 100_000),
        ],
    },
    ProviderDescriptor {
        id: "xai",
        display_name: "xAI",
        hosts: &["api.x.ai"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: OPENAI_CHAT_PATH,
        models: &[ModelSpec::new("grok-beta", 60, 128_000)],
    },
    ProviderDescriptor {
        id: "mistral",
        display_name: "Mistral",
        hosts: &["api.mistral.ai"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: OPENAI_CHAT_PATH,
        models: &[
            ModelSpec::new("open-mistral-7b", 60, 32_000),
            ModelSpec::new("mistral-small-latest", 60, 32_000),
            ModelSpec::new("open-mixtral-8x7b", 60, 32_000),
            ModelSpec::new("open-mixtral-8x22b", 60, 64_000),
            ModelSpec::new("mistral-medium-latest", 60, 32_000),
            ModelSpec::new("mistral-large-latest", 60, 128_000),
            ModelSpec::new("pixtral-12b-2409", 60, 128_000),
        ],
    },
    ProviderDescriptor {
        id: "groq",
        display_name: "Groq",
        hosts: &["api.groq.com"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: "/openai/v1/chat/completions",
        models: &[
            ModelSpec::new("gemma2-9b-it", 30, 8_000),
            ModelSpec::new("llama3-70b-8192", 30, 8_000),
            ModelSpec::new("llama3-8b-8192", 30, 8_000),
            ModelSpec::new("mixtral-8x7b-32768", 30, 32_000),
        ],
    },
    ProviderDescriptor {
        id: "alibaba",
        display_name: "Alibaba DashScope",
        hosts: &["dashscope.aliyuncs.com"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: "/compatible-mode/v1/chat/completions",
        models: &[
            ModelSpec::new("qwen-turbo", 60, 128_000),
            ModelSpec::new("qwen-plus", 60, 128_000),
            ModelSpec::new("qwen-long", 60, 128_000),
            ModelSpec::new("qwen-max", 60, 32_000),
        ],
    },
    ProviderDescriptor {
        id: "duckduckgo",
        display_name: "DuckDuckGo AI Chat",
        hosts: &["duckduckgo.com"],
        family: ProtocolFamily::HandshakeToken,
        chat_path: "/duckchat/v1/chat",
        models: &[
            ModelSpec::new("gpt-4o-mini", 15, 16_000),
            ModelSpec::new("claude-3-haiku-20240307", 15, 16_000),
            ModelSpec::new("meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo", 15, 16_000),
            ModelSpec::new("mistralai/Mixtral-8x7B-Instruct-v0.1", 15, 16_000),
        ],
    },
    // Local browser relay exposing an OpenAI-compatible endpoint; usually
    // needs chatMode = single_turn.
    ProviderDescriptor {
        id: "relay",
        display_name: "Browser Relay",
        hosts: &["http://127.0.0.1:5000"],
        family: ProtocolFamily::OpenAiCompatible,
        chat_path: OPENAI_CHAT_PATH,
        models: &[ModelSpec::new("default", 10, 32_000)],
    },
];

// ─────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────

/// All providers, in catalog order.
pub fn list_providers() -> &'static [ProviderDescriptor] {
    PROVIDERS
}

/// Find a provider by id (case-insensitive).
pub fn find_provider(id: &str) -> Result<&'static ProviderDescriptor, ChatError> {
    PROVIDERS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| ChatError::Configuration(format!("unsupported provider: {id}")))
}

/// Models offered by a provider.
pub fn list_models(provider_id: &str) -> Result<&'static [ModelSpec], ChatError> {
    Ok(find_provider(provider_id)?.models)
}

/// Resolve a model by name, falling back to the provider's first model.
pub fn resolve_model(provider_id: &str, requested: &str) -> Result<ModelSpec, ChatError> {
    let provider = find_provider(provider_id)?;
    let model = provider
        .models
        .iter()
        .find(|m| m.name == requested)
        .or_else(|| provider.models.first())
        .ok_or_else(|| {
            ChatError::Configuration(format!("provider {} has no models", provider.id))
        })?;
    Ok(model.clamped())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

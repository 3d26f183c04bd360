//! Protocol adapter: one vendor family bound to one session.
//!
//! The family is chosen once, when the adapter is built; each `chat` call then
//! shapes the payload, sends it through the [`ConnectionPool`], and pulls the
//! reply text out of the response.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, info};

use inkwell_core::config::Config;
use inkwell_core::types::Message;

use crate::error::ChatError;
use crate::pool::ConnectionPool;
use crate::registry::{self, ModelSpec, ProtocolFamily, ProviderDescriptor};
use crate::traits::{ChatProvider, ChatReply};
use crate::wire;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Per-family wire state, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Wire {
    OpenAi { path: &'static str },
    Legacy { path: &'static str },
    Structured,
    Handshake,
}

impl Wire {
    fn for_provider(provider: &ProviderDescriptor) -> Self {
        match provider.family {
            ProtocolFamily::OpenAiCompatible => Wire::OpenAi {
                path: provider.chat_path,
            },
            ProtocolFamily::LegacyCompletion => Wire::Legacy {
                path: provider.chat_path,
            },
            ProtocolFamily::StructuredTurn => Wire::Structured,
            ProtocolFamily::HandshakeToken => Wire::Handshake,
        }
    }
}

/// The session's [`ChatProvider`]: vendor, model, key, and endpoints.
pub struct ProtocolAdapter {
    provider: &'static ProviderDescriptor,
    model: ModelSpec,
    api_key: String,
    single_turn: bool,
    wire: Wire,
    pool: ConnectionPool,
}

impl std::fmt::Debug for ProtocolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolAdapter")
            .field("provider", &self.provider.id)
            .field("model", &self.model.name)
            .field("single_turn", &self.single_turn)
            .field("endpoints", &self.pool.len())
            .finish()
    }
}

impl ProtocolAdapter {
    /// Bind a provider and model to a set of hosts. Empty `hosts` means the
    /// registry's defaults.
    pub fn new(
        provider: &'static ProviderDescriptor,
        model: ModelSpec,
        api_key: impl Into<String>,
        hosts: &[String],
        single_turn: bool,
    ) -> Result<Self, ChatError> {
        let pool = if hosts.is_empty() {
            ConnectionPool::new(provider.hosts)?
        } else {
            ConnectionPool::new(hosts)?
        };

        Ok(ProtocolAdapter {
            provider,
            model,
            api_key: api_key.into(),
            single_turn,
            wire: Wire::for_provider(provider),
            pool,
        })
    }

    pub fn provider(&self) -> &'static ProviderDescriptor {
        self.provider
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ConnectionPool {
        &mut self.pool
    }

    async fn chat_openai(
        &mut self,
        path: &'static str,
        messages: &[Message],
    ) -> Result<ChatReply, ChatError> {
        let payload = wire::openai_payload(self.model.name, messages, self.single_turn);
        let mut headers = json_headers();
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", self.api_key))?);

        let resp = self.pool.request(path, &payload, &headers).await?;
        let text = wire::extract_openai_reply(&resp.json()?)?;
        Ok(ChatReply {
            text,
            host: resp.host,
        })
    }

    async fn chat_legacy(
        &mut self,
        path: &'static str,
        messages: &[Message],
    ) -> Result<ChatReply, ChatError> {
        let payload = wire::legacy_payload(self.model.name, messages);
        let mut headers = json_headers();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(HeaderName::from_static("x-api-key"), header_value(&self.api_key)?);

        let resp = self.pool.request(path, &payload, &headers).await?;
        let text = wire::extract_legacy_reply(&resp.json()?)?;
        Ok(ChatReply {
            text,
            host: resp.host,
        })
    }

    async fn chat_structured(&mut self, messages: &[Message]) -> Result<ChatReply, ChatError> {
        let path = wire::structured_path(self.model.name, &self.api_key)?;
        let payload = wire::structured_payload(messages);

        let resp = self.pool.request(&path, &payload, &json_headers()).await?;
        let text = wire::extract_structured_reply(&resp.json()?)?;
        Ok(ChatReply {
            text,
            host: resp.host,
        })
    }

    /// Token request then chat, both on the same endpoint.
    async fn chat_handshake(&mut self, messages: &[Message]) -> Result<ChatReply, ChatError> {
        let index = self.pool.claim();

        let mut status_headers = HeaderMap::new();
        status_headers.insert(
            HeaderName::from_static(wire::HANDSHAKE_ACCEPT_HEADER),
            HeaderValue::from_static("1"),
        );
        let status = self
            .pool
            .send_at(index, Method::GET, wire::HANDSHAKE_STATUS_PATH, None, &status_headers)
            .await?;
        let token = status
            .header(wire::HANDSHAKE_TOKEN_HEADER)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ChatError::malformed(format!("missing {} header", wire::HANDSHAKE_TOKEN_HEADER))
            })?
            .to_string();
        debug!(host = %status.host, "handshake token acquired");

        let payload = wire::handshake_payload(self.model.name, messages);
        let mut headers = json_headers();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let token = HeaderValue::from_str(&token)
            .map_err(|_| ChatError::malformed("handshake token is not a valid header value"))?;
        headers.insert(HeaderName::from_static(wire::HANDSHAKE_TOKEN_HEADER), token);
        let resp = self
            .pool
            .send_at(
                index,
                Method::POST,
                wire::HANDSHAKE_CHAT_PATH,
                Some(&payload),
                &headers,
            )
            .await?;

        let text = wire::reassemble_stream(&resp.body)?;
        let text = wire::extract_openai_reply(&wire::wrap_as_openai(&text))?;
        Ok(ChatReply {
            text,
            host: resp.host,
        })
    }
}

#[async_trait]
impl ChatProvider for ProtocolAdapter {
    async fn chat(&mut self, messages: &[Message]) -> Result<ChatReply, ChatError> {
        if self.api_key.trim().is_empty() {
            return Err(ChatError::Configuration("the api key is empty".to_string()));
        }

        debug!(
            provider = self.provider.id,
            model = self.model.name,
            messages = messages.len(),
            single_turn = self.single_turn,
            "calling model"
        );

        let reply = match self.wire.clone() {
            Wire::OpenAi { path } => self.chat_openai(path, messages).await,
            Wire::Legacy { path } => self.chat_legacy(path, messages).await,
            Wire::Structured => self.chat_structured(messages).await,
            Wire::Handshake => self.chat_handshake(messages).await,
        }?;

        debug!(
            provider = self.provider.id,
            host = %reply.host,
            chars = reply.text.len(),
            "reply received"
        );
        Ok(reply)
    }

    fn display_name(&self) -> String {
        format!("{}/{}", self.provider.id, self.model.name)
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn header_value(value: &str) -> Result<HeaderValue, ChatError> {
    HeaderValue::from_str(value)
        .map_err(|_| ChatError::Configuration("api key contains invalid characters".to_string()))
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build the adapter described by the config: provider, model (first model if
/// unknown), hosts, key, and chat mode.
pub fn create_adapter(config: &Config) -> Result<ProtocolAdapter, ChatError> {
    let provider = registry::find_provider(&config.provider)?;
    let model = registry::resolve_model(provider.id, &config.model)?;
    if model.name != config.model {
        info!(
            requested = %config.model,
            using = model.name,
            "unknown model, using provider default"
        );
    }

    let hosts = config.hosts();
    debug!(
        provider = provider.id,
        model = model.name,
        hosts = hosts.len(),
        "creating protocol adapter"
    );

    ProtocolAdapter::new(
        provider,
        model,
        config.api_key.clone(),
        &hosts,
        config.chat_mode.is_single_turn(),
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

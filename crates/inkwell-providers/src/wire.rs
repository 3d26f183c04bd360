//! Wire formats: canonical messages in, vendor payloads out, reply text back.
//!
//! Pure functions only; the network side lives in [`crate::adapter`].

use inkwell_core::types::{Message, Role};
use serde_json::{json, Value};

use crate::error::ChatError;

/// Reply-length ceiling always sent to the legacy completion endpoint.
pub const LEGACY_MAX_TOKENS: u32 = 256;

// ─────────────────────────────────────────────
// OpenAI-compatible family
// ─────────────────────────────────────────────

/// Chat payload: the message array verbatim, or in single-turn mode one user
/// message narrating the whole conversation.
pub fn openai_payload(model: &str, messages: &[Message], single_turn: bool) -> Value {
    let messages = if single_turn {
        json!([{"role": "user", "content": narrate_single_turn(messages)}])
    } else {
        json!(messages)
    };
    json!({"model": model, "messages": messages})
}

/// Fold a conversation into one prompt for backends that accept a single message.
///
/// The newest user message becomes the final request; everything before it is
/// narrated as background, earlier questions, and earlier answers.
pub fn narrate_single_turn(messages: &[Message]) -> String {
    let newest = messages.iter().rposition(|m| m.role == Role::User);
    let mut parts = Vec::with_capacity(messages.len());

    for (i, msg) in messages.iter().enumerate() {
        if Some(i) == newest || msg.content.trim().is_empty() {
            continue;
        }
        let label = match msg.role {
            Role::System => "Background information",
            Role::User => "I asked",
            Role::Assistant => "Your response",
        };
        parts.push(format!("{label}: {}", msg.content));
    }

    if let Some(i) = newest {
        parts.push(format!("Now please respond to this: {}", messages[i].content));
    }
    parts.join("\n\n")
}

/// `choices[0].message.content`
pub fn extract_openai_reply(data: &Value) -> Result<String, ChatError> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ChatError::malformed("missing choices[0].message.content"))
}

// ─────────────────────────────────────────────
// Legacy completion family
// ─────────────────────────────────────────────

/// One prompt with `Human:` / `Assistant:` markers and an open assistant turn.
pub fn legacy_prompt(messages: &[Message]) -> String {
    let mut prompt: String = messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::Assistant => "Assistant",
                Role::System | Role::User => "Human",
            };
            format!("\n\n{speaker}: {}", m.content)
        })
        .collect();
    prompt.push_str("\n\nAssistant:");
    prompt
}

pub fn legacy_payload(model: &str, messages: &[Message]) -> Value {
    json!({
        "prompt": legacy_prompt(messages),
        "model": model,
        "max_tokens_to_sample": LEGACY_MAX_TOKENS,
    })
}

/// `completion`
pub fn extract_legacy_reply(data: &Value) -> Result<String, ChatError> {
    data["completion"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ChatError::malformed("missing completion"))
}

// ─────────────────────────────────────────────
// Structured-turn family
// ─────────────────────────────────────────────

pub fn structured_payload(messages: &[Message]) -> Value {
    let contents: Vec<Value> = messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                Role::System | Role::User => "user",
            };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();
    json!({"contents": contents})
}

/// Path carrying the model and the key, with the key form-encoded.
pub fn structured_path(model: &str, api_key: &str) -> Result<String, ChatError> {
    let url = reqwest::Url::parse_with_params(
        &format!("http://localhost/v1beta/models/{model}:generateContent"),
        &[("key", api_key)],
    )
    .map_err(|e| ChatError::Configuration(format!("invalid model name {model:?}: {e}")))?;
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

/// `candidates[0].content.parts[0].text`
pub fn extract_structured_reply(data: &Value) -> Result<String, ChatError> {
    data["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ChatError::malformed("missing candidates[0].content.parts[0].text"))
}

// ─────────────────────────────────────────────
// Handshake-token family
// ─────────────────────────────────────────────

pub const HANDSHAKE_STATUS_PATH: &str = "/duckchat/v1/status";
pub const HANDSHAKE_CHAT_PATH: &str = "/duckchat/v1/chat";
pub const HANDSHAKE_ACCEPT_HEADER: &str = "x-vqd-accept";
pub const HANDSHAKE_TOKEN_HEADER: &str = "x-vqd-4";

/// Chat payload; the backend knows no system role, so it is sent as user.
pub fn handshake_payload(model: &str, messages: &[Message]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "assistant",
                Role::System | Role::User => "user",
            };
            json!({"role": role, "content": m.content})
        })
        .collect();
    json!({"model": model, "messages": messages})
}

/// Join the `message` fields of a `data: {...}` event stream, stopping at `[DONE]`.
pub fn reassemble_stream(body: &str) -> Result<String, ChatError> {
    let mut text = String::new();
    let mut chunks = 0usize;

    for line in body.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data == "[DONE]" {
            break;
        }
        if let Ok(event) = serde_json::from_str::<Value>(data) {
            chunks += 1;
            if let Some(piece) = event["message"].as_str() {
                text.push_str(piece);
            }
        }
    }

    if chunks == 0 {
        return Err(ChatError::malformed("no chunks in streamed reply"));
    }
    Ok(text)
}

/// Dress reassembled text as an OpenAI-compatible response so extraction is shared.
pub fn wrap_as_openai(text: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

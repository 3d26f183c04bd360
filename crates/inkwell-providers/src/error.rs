//! Failures surfaced by the provider layer.

use thiserror::Error;

/// Everything that can go wrong while turning messages into a reply.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or invalid provider, model, host, or API key.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The connection broke and the single retry failed too.
    #[error("transport error on {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// The vendor answered with a non-2xx status.
    #[error("HTTP {status} {reason}: {body}")]
    Provider {
        status: u16,
        reason: String,
        body: String,
    },

    /// The response lacked the field holding the reply.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ChatError::MalformedResponse(detail.into())
    }
}

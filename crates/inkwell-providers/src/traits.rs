//! Chat provider trait: the seam between the session and any backend.
//!
//! [`crate::adapter::ProtocolAdapter`] is the real implementation; tests can
//! plug in scripted doubles.

use async_trait::async_trait;
use inkwell_core::types::Message;

use crate::error::ChatError;

/// A successful reply and the host that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub host: String,
}

/// Something that can answer a canonical message sequence.
///
/// Calls take `&mut self`: a provider owns mutable transport state and a
/// session never has two calls in flight.
#[async_trait]
pub trait ChatProvider: Send {
    /// Send `messages` (index 0 is the system message) and return the reply.
    async fn chat(&mut self, messages: &[Message]) -> Result<ChatReply, ChatError>;

    /// `provider/model`, for banners and logs.
    fn display_name(&self) -> String;
}

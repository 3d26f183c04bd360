//! Context budgeter.
//!
//! Sizes are byte counts standing in for tokens: the budget is
//! `token_limit × 3` and each message costs its content length plus a flat
//! envelope overhead. Failed turns cost only the overhead and are forwarded
//! with empty content.

use inkwell_core::types::Message;

/// Per-message cost of the protocol envelope.
pub const ENVELOPE_OVERHEAD: usize = 20;

/// Bytes counted per token of the configured limit.
pub const BYTES_PER_TOKEN: usize = 3;

/// Byte budget for a token limit.
pub fn budget_bytes(token_limit: u32) -> usize {
    token_limit as usize * BYTES_PER_TOKEN
}

/// Sized cost of one message.
pub fn message_cost(message: &Message) -> usize {
    let content = if message.is_failure() {
        0
    } else {
        message.content.len()
    };
    content + ENVELOPE_OVERHEAD
}

/// Keep the system message and the longest run of newest messages that fits.
///
/// Walks from the newest message back and stops at the first one that would
/// overflow, so the result is always the system message plus a contiguous
/// suffix. Order is preserved.
pub fn trim(messages: &[Message], budget_bytes: usize) -> Vec<Message> {
    let Some((system, rest)) = messages.split_first() else {
        return Vec::new();
    };

    let mut total = message_cost(system);
    let mut start = rest.len();
    if total <= budget_bytes {
        for (i, message) in rest.iter().enumerate().rev() {
            let cost = message_cost(message);
            if total + cost > budget_bytes {
                break;
            }
            total += cost;
            start = i;
        }
    }

    let mut trimmed = Vec::with_capacity(1 + rest.len() - start);
    trimmed.push(forwarded(system));
    trimmed.extend(rest[start..].iter().map(forwarded));
    trimmed
}

fn forwarded(message: &Message) -> Message {
    if message.is_failure() {
        Message {
            role: message.role,
            content: String::new(),
        }
    } else {
        message.clone()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

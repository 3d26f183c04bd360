//! Conversation titles.
//!
//! The first user turn names the conversation from its opening words; after
//! the second round trip the model is asked for a short summary title.

use inkwell_core::types::MAX_TOPIC_CHARS;
use inkwell_core::utils::take_chars;

/// Words taken from the first user turn.
pub const TOPIC_WORDS: usize = 6;

/// Instruction appended as a user message when asking the model for a title.
pub const TOPIC_PROMPT: &str = "Please give this conversation a short title.
- Hard limit of 5 words.
- Don't mention yourself in it.
- Don't use any special characters.
- Don't use any capital letters.
- Don't use any punctuation.
- Don't use any symbols.
- Don't use any emojis.
- Don't use any accents.
- Don't use quotes.";

/// Title from the opening words of a user turn.
pub fn topic_from_first_turn(text: &str) -> String {
    let cleaned = text.replace(&['"', '\'', '\n', '\r'][..], " ");
    let words: Vec<&str> = cleaned.split_whitespace().take(TOPIC_WORDS).collect();
    take_chars(&words.join(" "), MAX_TOPIC_CHARS).trim().to_string()
}

/// Title from a summarization reply. Empty when nothing usable is left.
pub fn clean_summary(reply: &str) -> String {
    let cleaned: String = reply
        .chars()
        .filter(|c| !matches!(c, '`' | '"' | '\n' | '\r'))
        .collect();
    take_chars(cleaned.trim(), MAX_TOPIC_CHARS).trim().to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

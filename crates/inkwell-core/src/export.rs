//! Plain-text export of conversations.
//!
//! An export is one `.txt` file: every conversation under a `Topic:` heading,
//! then its turns as `User:` / `AI:` blocks. Content is written as stored,
//! with no markdown processing.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{Conversation, Role};

/// Suffix added to export names that don't already carry it.
pub const EXPORT_SUFFIX: &str = ".txt";

const RULE_WIDTH: usize = 40;

/// Render conversations as plain text. The system message, if present, is
/// left out.
pub fn render(conversations: &[Conversation]) -> String {
    let mut out = String::new();
    for conversation in conversations {
        out.push_str(&format!("Topic: {}\n", conversation.topic));
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');

        for message in &conversation.messages {
            let label = match message.role {
                Role::System => continue,
                Role::User => "User:",
                Role::Assistant => "AI:",
            };
            out.push_str(label);
            out.push('\n');
            for line in message.content.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// First candidate that is an existing, writable directory.
pub fn writable_dir(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| {
            std::fs::metadata(dir)
                .map(|m| m.is_dir() && !m.permissions().readonly())
                .unwrap_or(false)
        })
        .cloned()
}

/// Write `conversations` to `dir/name[.txt]` and return the path written.
///
/// `name` must be a bare file name.
pub fn write_export(
    dir: &Path,
    name: &str,
    conversations: &[Conversation],
) -> std::io::Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid export name: {name:?}"),
        ));
    }

    let file_name = if name.ends_with(EXPORT_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{EXPORT_SUFFIX}")
    };
    let path = dir.join(file_name);
    std::fs::write(&path, render(conversations))?;
    debug!(path = %path.display(), conversations = conversations.len(), "exported conversations");
    Ok(path)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Shared CLI helpers: path expansion, range parsing, chat rendering.

use std::path::PathBuf;

use colored::Colorize;

use inkwell_core::types::{Message, Role, ERROR_PREFIX};
use inkwell_session::TurnOutcome;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Parse `N`, `N-M`, and comma-separated lists of both into positions.
/// Spaces are ignored; malformed pieces are skipped. Spans stop at `limit`.
pub fn parse_range(text: &str, limit: usize) -> Vec<usize> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut positions = Vec::new();

    for piece in compact.split(',') {
        match piece.split_once('-') {
            Some((start, end)) => {
                if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
                    positions.extend(start..=end.min(limit));
                }
            }
            None => {
                if let Ok(n) = piece.parse::<usize>() {
                    positions.push(n);
                }
            }
        }
    }
    positions
}

// ─────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Inkwell".cyan().bold(), version.dimmed());
    println!("Model: {}", model.bold());
    println!(
        "{}",
        "Empty line to send, ? for the menu, ! to replay, q to quit".dimmed()
    );
}

/// Print a speaker bubble, with the topic for the user's side.
pub fn print_bubble(role: Role, topic: &str) {
    let label = match role {
        Role::User => format!("{} ({})", role.as_str(), topic),
        Role::System | Role::Assistant => role.as_str().to_string(),
    };
    let width = label.chars().count() + 2;
    let paint = |s: String| match role {
        Role::User => s.green().to_string(),
        Role::System | Role::Assistant => s.blue().to_string(),
    };

    println!();
    println!("{}", paint(format!("╭{}╮", "─".repeat(width))));
    println!("{}", paint(format!("│ {label} │")));
    println!("{}", paint(format!("╰{}╯", "─".repeat(width))));
}

/// Echo a user turn the way it was typed.
pub fn print_user_message(topic: &str, content: &str) {
    print_bubble(Role::User, topic);
    for line in content.lines().filter(|l| !l.is_empty()) {
        println!("» {line}");
    }
}

/// Print a model reply.
pub fn print_reply(text: &str) {
    print_bubble(Role::Assistant, "");
    if text.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", text.replace("\n\n", "\n").trim_matches('\n'));
    }
}

/// Print a failed turn.
pub fn print_error(description: &str) {
    print_bubble(Role::Assistant, "");
    println!("{}{}", ERROR_PREFIX.red().bold(), description);
}

pub fn print_outcome(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Reply { text, .. } => print_reply(text),
        TurnOutcome::Failed { error } => print_error(&error.to_string()),
    }
}

/// Re-render a conversation after switching or returning from the menu.
pub fn print_conversation(topic: &str, messages: &[Message]) {
    for message in messages.iter().skip(1) {
        match message.role {
            Role::User => print_user_message(topic, &message.content),
            _ if message.is_failure() => {
                print_error(message.content.trim_start_matches(ERROR_PREFIX))
            }
            _ => print_reply(&message.content),
        }
    }
    print_bubble(Role::User, topic);
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

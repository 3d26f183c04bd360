//! Interactive chat loop.
//!
//! Uses `rustyline` for line editing with persistent input history. Lines
//! accumulate until an empty line sends them as one user turn.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use inkwell_core::types::Role;
use inkwell_session::Session;

use crate::helpers;
use crate::menu::{self, MenuExit};

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Menu,
    Replay,
    Send,
    Line(String),
}

fn classify(line: &str) -> Input {
    match line.trim() {
        "q" => Input::Quit,
        "?" => Input::Menu,
        "!" => Input::Replay,
        "" => Input::Send,
        _ => Input::Line(line.to_string()),
    }
}

/// Run the chat loop until the user quits.
pub async fn run(mut session: Session) -> Result<()> {
    helpers::print_banner(&session.provider_name());

    let mut editor = create_editor()?;
    session.start();
    helpers::print_bubble(Role::User, session.topic());

    let mut pending: Vec<String> = Vec::new();
    loop {
        let line = match editor.readline("» ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        match classify(&line) {
            Input::Quit => break,
            Input::Line(text) => pending.push(text),
            Input::Send if pending.is_empty() => {}
            Input::Send => {
                let text = pending.join("\n");
                pending.clear();
                let _ = editor.add_history_entry(text.as_str());

                debug!(chars = text.len(), "sending turn");
                helpers::print_thinking();
                let outcome = session.submit(&text).await;
                helpers::clear_thinking();
                helpers::print_outcome(&outcome);
                helpers::print_bubble(Role::User, session.topic());
            }
            Input::Replay => {
                pending.clear();
                helpers::print_thinking();
                let outcome = session.replay_last().await;
                helpers::clear_thinking();
                match outcome {
                    Some(outcome) => helpers::print_outcome(&outcome),
                    None => println!("Nothing to replay yet"),
                }
                helpers::print_bubble(Role::User, session.topic());
            }
            Input::Menu => {
                pending.clear();
                if menu::run(&mut session, &mut editor)? == MenuExit::Quit {
                    break;
                }
            }
        }
    }

    menu::report(session.quit());
    save_history(&mut editor);
    println!("\nGoodbye!");
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save input history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save REPL history: {e}");
    }
}

/// Line-editor history, separate from the conversation history file.
fn history_path() -> std::path::PathBuf {
    inkwell_core::utils::get_data_path().join("input_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

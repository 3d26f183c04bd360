//! Conversation menu, opened with `?` from the chat prompt.
//!
//! ```text
//! [   0   ] start a new conversation
//! [   N   ] continue conversation N
//! [ dN-M  ] delete one or a range of conversations (d0 = the current one)
//! [ eN-M  ] export one or a range of conversations (e0 = the current one)
//! [ Enter ] return to the current one
//! [   q   ] quit
//! ```

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::warn;

use inkwell_core::export;
use inkwell_core::types::Role;
use inkwell_core::utils::get_data_path;
use inkwell_session::{Session, SessionError};

use crate::helpers;

/// One line typed at the menu prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Return,
    Quit,
    New,
    Switch(usize),
    Delete(Vec<usize>),
    Export(Vec<usize>),
    Invalid,
}

/// What the chat loop should do once the menu closes.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuExit {
    Resume,
    Quit,
}

/// Parse a menu line. Ranges stop at `history_len`.
pub fn parse_choice(input: &str, history_len: usize) -> MenuChoice {
    let input = input.trim();
    if input.is_empty() {
        return MenuChoice::Return;
    }
    if input == "q" {
        return MenuChoice::Quit;
    }
    if let Some(rest) = input.strip_prefix('d') {
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            return MenuChoice::Delete(helpers::parse_range(rest, history_len));
        }
        return MenuChoice::Invalid;
    }
    if let Some(rest) = input.strip_prefix('e') {
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            return MenuChoice::Export(helpers::parse_range(rest, history_len));
        }
        return MenuChoice::Invalid;
    }
    if input.chars().all(|c| c.is_ascii_digit()) {
        return match input.parse::<usize>() {
            Ok(0) => MenuChoice::New,
            Ok(n) => MenuChoice::Switch(n),
            Err(_) => MenuChoice::Invalid,
        };
    }
    MenuChoice::Invalid
}

/// Show the menu and act on choices until one leaves it.
pub fn run(session: &mut Session, editor: &mut Editor<(), DefaultHistory>) -> Result<MenuExit> {
    loop {
        print_menu(session);

        // Inner loop: keep reading until a choice needs the menu redrawn.
        loop {
            let input = match editor.readline("» ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    return Ok(MenuExit::Quit)
                }
                Err(e) => return Err(e.into()),
            };

            match parse_choice(&input, session.history().len()) {
                MenuChoice::Return => {
                    helpers::print_conversation(session.topic(), session.messages());
                    return Ok(MenuExit::Resume);
                }
                MenuChoice::Quit => return Ok(MenuExit::Quit),
                MenuChoice::New => {
                    report(session.new_conversation());
                    println!("{}", " NEW CONVERSATION STARTED".bold());
                    helpers::print_bubble(Role::User, session.topic());
                    return Ok(MenuExit::Resume);
                }
                MenuChoice::Switch(position) => match session.switch_conversation(position) {
                    Err(SessionError::OutOfRange { .. }) => {
                        println!("The conversation number is out of range");
                    }
                    result => {
                        report(result);
                        helpers::print_conversation(session.topic(), session.messages());
                        return Ok(MenuExit::Resume);
                    }
                },
                MenuChoice::Delete(positions) => {
                    report(session.delete_conversations(&positions).map(|_| ()));
                    break;
                }
                MenuChoice::Export(positions) => {
                    if export_conversations(session, editor, &positions)? == MenuExit::Quit {
                        return Ok(MenuExit::Quit);
                    }
                }
                MenuChoice::Invalid => {
                    println!("{}", "Unknown choice".dimmed());
                }
            }
        }
    }
}

fn print_menu(session: &Session) {
    println!();
    println!("{}", " Current conversation ".white().on_yellow().bold());
    println!("{}", session.topic());
    println!();
    println!("{}", " Previous conversations ".white().on_yellow().bold());
    let history = session.history();
    if history.is_empty() {
        println!("{}", "No previous conversations found!".dimmed());
    } else {
        for (i, conversation) in history.entries().iter().enumerate() {
            println!("{:2}. {}", i + 1, conversation.topic.dimmed());
        }
    }
    println!();
    println!("{}", " Choose a conversation to continue, OR ".white().on_yellow().bold());
    println!("[   0   ] {}", "start a new conversation".dimmed());
    println!("[ dnum  ] {}", "delete one or a range of conversations".dimmed());
    println!("[ enum  ] {}", "export one or a range of conversations".dimmed());
    println!("[ Enter ] {}", "return to the current one".dimmed());
    println!("[   q   ] {}", "quit".dimmed());
}

/// Ask for a file name and write the selected conversations to the first
/// writable export directory.
fn export_conversations(
    session: &Session,
    editor: &mut Editor<(), DefaultHistory>,
    positions: &[usize],
) -> Result<MenuExit> {
    let conversations = session.export_selection(positions);
    if conversations.is_empty() {
        println!("No conversation matches the selected number");
        return Ok(MenuExit::Resume);
    }

    let name = match editor.readline("File name: ") {
        Ok(line) => line,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(MenuExit::Quit),
        Err(e) => return Err(e.into()),
    };
    if name.trim().is_empty() {
        println!("{}", "Export cancelled".dimmed());
        return Ok(MenuExit::Resume);
    }

    let Some(dir) = export::writable_dir(&export_candidates()) else {
        println!("{}", "Cannot find a writable directory".red());
        return Ok(MenuExit::Resume);
    };
    match export::write_export(&dir, &name, &conversations) {
        Ok(path) => println!("Exported to {}", path.display().to_string().bold()),
        Err(e) => {
            warn!(error = %e, "export failed");
            eprintln!("{}", format!("Could not export: {e}").red());
        }
    }
    Ok(MenuExit::Resume)
}

fn export_candidates() -> Vec<std::path::PathBuf> {
    let mut dirs = vec![get_data_path()];
    dirs.extend(dirs_next::document_dir());
    dirs.extend(dirs_next::home_dir());
    dirs
}

/// Persistence failures are shown and logged; the menu carries on.
pub fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        warn!(error = %e, "history update failed");
        eprintln!("{}", e.to_string().red());
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

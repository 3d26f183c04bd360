//! `inkwell init`: write a default config and an example prompt catalog.
//!
//! Existing files are left untouched.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use inkwell_core::config::{save_config, Config};
use inkwell_core::prompts::PromptCatalog;

/// Run the init command.
pub fn run(config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "Inkwell Setup".cyan().bold());
    println!();

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    create_template(&PromptCatalog::path_beside(config_path), PROMPTS_TEMPLATE)?;

    println!();
    println!(
        "{}",
        "  Setup complete! Set \"provider\" and \"apiKey\", then run `inkwell`.".green()
    );
    println!();

    Ok(())
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────

const PROMPTS_TEMPLATE: &str = "translator
You are a translator. Translate everything the user writes into English.
If it is already English, translate it into French. Reply with the translation only.
-----
reviewer
You are a senior software engineer reviewing code.
Point out bugs first, then style issues. Keep it short.
-----
explainer
Explain the topic the user asks about to a curious twelve-year-old.
Use short sentences and one concrete example.
";

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

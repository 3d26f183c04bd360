//! `inkwell status`: show configuration, history, prompts, and providers.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use inkwell_core::config::load_config;
use inkwell_core::history::{HistoryRepository, JsonHistoryFile};
use inkwell_core::prompts::PromptCatalog;
use inkwell_providers::registry::{self, ProtocolFamily, PROVIDERS};

/// Run the status command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path));

    println!();
    println!("{}", "Inkwell Status".cyan().bold());
    println!();

    println!("  {:<14} {} {}", "Config:".bold(), config_path.display(), found(config_path));

    let model = match registry::resolve_model(&config.provider, &config.model) {
        Ok(spec) if spec.name == config.model => format!("{}/{}", config.provider, spec.name),
        Ok(spec) => format!(
            "{}/{} {}",
            config.provider,
            spec.name,
            format!("(\"{}\" unknown)", config.model).yellow()
        ),
        Err(e) => e.to_string().red().to_string(),
    };
    println!("  {:<14} {}", "Model:".bold(), model);

    let key = if config.has_api_key() {
        format!("{} (key set)", "✓".green())
    } else {
        "· not configured".dimmed().to_string()
    };
    println!("  {:<14} {}", "API key:".bold(), key);

    let hosts = config.hosts();
    let hosts = if hosts.is_empty() {
        "(provider default)".dimmed().to_string()
    } else {
        hosts.join(", ")
    };
    println!("  {:<14} {}", "Hosts:".bold(), hosts);
    println!(
        "  {:<14} {} | {}",
        "Parameters:".bold(),
        format!("tokens: {}", config.token_limit).dimmed(),
        format!("chat mode: {:?}", config.chat_mode).dimmed(),
    );

    // History
    let history = JsonHistoryFile::beside(config_path);
    let count = if config.max_history == 0 {
        "disabled".dimmed().to_string()
    } else {
        format!("{} of {} conversations", history.load().len(), config.max_history)
    };
    println!("  {:<14} {} ({})", "History:".bold(), history.path().display(), count);

    // Prompts
    let prompts_path = PromptCatalog::path_beside(config_path);
    let catalog = PromptCatalog::load(&prompts_path);
    let names: Vec<&str> = catalog.names().collect();
    let selected = catalog.select(&config.prompt, &config.custom_prompt);
    println!(
        "  {:<14} {} (using {})",
        "Prompts:".bold(),
        if names.is_empty() {
            "none".dimmed().to_string()
        } else {
            names.join(", ")
        },
        selected.bold()
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for provider in PROVIDERS {
        let marker = if provider.id == config.provider {
            "●".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "   {} {:<12} {:<20} {} models, {}",
            marker,
            provider.id,
            provider.display_name,
            provider.models.len(),
            family_label(provider.family).dimmed()
        );
    }
    println!();

    Ok(())
}

fn found(path: &Path) -> String {
    if path.exists() {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn family_label(family: ProtocolFamily) -> &'static str {
    match family {
        ProtocolFamily::OpenAiCompatible => "openai-compatible",
        ProtocolFamily::LegacyCompletion => "legacy completion",
        ProtocolFamily::StructuredTurn => "structured turns",
        ProtocolFamily::HandshakeToken => "handshake token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_runs_without_config() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir.path().join("config.json")).unwrap();
    }

    #[test]
    fn family_labels_distinct() {
        let labels = [
            family_label(ProtocolFamily::OpenAiCompatible),
            family_label(ProtocolFamily::LegacyCompletion),
            family_label(ProtocolFamily::StructuredTurn),
            family_label(ProtocolFamily::HandshakeToken),
        ];
        for (i, a) in labels.iter().enumerate() {
            assert!(labels[i + 1..].iter().all(|b| a != b));
        }
    }
}

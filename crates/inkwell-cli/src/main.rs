//! Inkwell CLI: entry point.
//!
//! # Commands
//!
//! - `inkwell [--config FILE] [--logs]`: interactive chat
//! - `inkwell init`: write a default config and an example prompt catalog
//! - `inkwell status`: show configuration, history, and providers

mod helpers;
mod init;
mod menu;
mod repl;
mod status;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use inkwell_core::config::{get_config_path, load_config};
use inkwell_session::Session;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Inkwell: a small terminal chat client for hosted LLMs
#[derive(Parser)]
#[command(name = "inkwell", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.inkwell/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value_t = false, global = true)]
    logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and an example prompt catalog
    Init,

    /// Show configuration, history, and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli
        .config
        .as_deref()
        .map(helpers::expand_tilde)
        .unwrap_or_else(get_config_path);

    match cli.command {
        None => run_chat(&config_path).await,
        Some(Commands::Init) => init::run(&config_path),
        Some(Commands::Status) => status::run(&config_path),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path));
    if !config.has_api_key() {
        bail!(
            "no API key configured; set \"apiKey\" in {} or INKWELL_API_KEY (run `inkwell init` first if the file is missing)",
            config_path.display()
        );
    }

    let session = Session::from_config(&config, config_path)
        .with_context(|| format!("failed to start a {} session", config.provider))?;
    info!(provider = %config.provider, model = %config.model, "session ready");

    repl::run(session).await
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("inkwell=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

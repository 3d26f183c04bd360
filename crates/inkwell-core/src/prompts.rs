//! System prompts: built-in instructions plus the flat-file prompt catalog.
//!
//! Catalog format (`prompts.txt` beside the config file):
//!
//! ```text
//! translator
//! You translate everything the user says into French.
//! -----
//! poet
//! Answer only in rhyming verse.
//! ```
//!
//! Entries are separated by a line holding only `-----`; the first non-empty
//! line of an entry is its name, the rest is the prompt text.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Prompt id for the built-in instructions.
pub const DEFAULT_PROMPT_ID: &str = "default";

/// Prompt id for the user's `customPrompt` text.
pub const CUSTOM_PROMPT_ID: &str = "custom";

/// File name of the prompt catalog, resolved relative to the config directory.
pub const PROMPTS_FILE: &str = "prompts.txt";

/// Line separating catalog entries.
pub const ENTRY_SEPARATOR: &str = "-----";

/// Built-in assistant instructions.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful personal assistant.
- Please note that your answers will be displayed on the terminal.
- So keep answers short as possible and use a suitable format for printing on a terminal.";

/// Named prompts loaded from the catalog file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromptCatalog {
    entries: Vec<(String, String)>,
}

impl PromptCatalog {
    /// Parse catalog text. Entries without a name or body are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        let mut flush = |lines: &mut Vec<&str>| {
            let mut iter = lines.iter().skip_while(|l| l.trim().is_empty());
            if let Some(name) = iter.next() {
                let body = iter.copied().collect::<Vec<_>>().join("\n");
                let body = body.trim();
                if !body.is_empty() {
                    entries.push((name.trim().to_string(), body.to_string()));
                }
            }
            lines.clear();
        };

        for line in text.lines() {
            if line.trim_end() == ENTRY_SEPARATOR {
                flush(&mut current);
            } else {
                current.push(line);
            }
        }
        flush(&mut current);

        PromptCatalog { entries }
    }

    /// Load the catalog from a file. A missing or unreadable file is empty.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No prompt catalog at {}", path.display());
            return PromptCatalog::default();
        }
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let catalog = PromptCatalog::parse(&text);
                debug!("Loaded {} prompts from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                warn!("Failed to read prompt catalog {}: {}", path.display(), e);
                PromptCatalog::default()
            }
        }
    }

    /// Catalog path for a given config file.
    pub fn path_beside(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(PROMPTS_FILE)
    }

    /// Find a prompt by name (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, text)| text.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Choose the prompt id for a fresh conversation: custom text first, then
    /// a preset named by `selection`, then the built-in default.
    pub fn select(&self, selection: &str, custom_text: &str) -> String {
        if !custom_text.trim().is_empty() {
            CUSTOM_PROMPT_ID.to_string()
        } else if self.lookup(selection).is_some() {
            selection.to_string()
        } else {
            DEFAULT_PROMPT_ID.to_string()
        }
    }

    /// System prompt text for a prompt id. Unknown ids and empty custom text
    /// fall back to the built-in instructions.
    pub fn resolve(&self, prompt_id: &str, custom_text: &str) -> String {
        let text = match prompt_id {
            DEFAULT_PROMPT_ID => None,
            CUSTOM_PROMPT_ID => Some(custom_text.trim()).filter(|t| !t.is_empty()),
            name => self.lookup(name),
        };
        text.unwrap_or(DEFAULT_INSTRUCTIONS).to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

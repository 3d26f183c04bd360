//! Conversation history: a bounded FIFO of flushed conversations plus the
//! JSON file that persists it.
//!
//! File format: `history.json` beside the config file, a pretty-printed array of
//! `{"topic": "...", "promptId": "...", "messages": [{"role": "...", "content": "..."}]}`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::Conversation;

/// File name of the history file, resolved relative to the config directory.
pub const HISTORY_FILE: &str = "history.json";

// ─────────────────────────────────────────────
// HistoryStore
// ─────────────────────────────────────────────

/// Ordered, capacity-bounded list of past conversations (oldest first).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryStore {
    entries: Vec<Conversation>,
    capacity: usize,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` conversations.
    pub fn new(capacity: usize) -> Self {
        HistoryStore {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Create a store from previously persisted entries, evicting the oldest
    /// ones if they exceed `capacity`.
    pub fn from_entries(entries: Vec<Conversation>, capacity: usize) -> Self {
        let mut store = HistoryStore { entries, capacity };
        store.evict();
        store
    }

    /// Append a conversation.
    ///
    /// If the newest entry has the same topic, it is overwritten instead
    /// (the conversation was continued, not started anew).
    pub fn append(&mut self, conversation: Conversation) {
        if self.capacity == 0 {
            return;
        }
        match self.entries.last_mut() {
            Some(last) if last.topic == conversation.topic => {
                debug!(topic = %conversation.topic, "merging into last history entry");
                *last = conversation;
            }
            _ => self.entries.push(conversation),
        }
        self.evict();
    }

    /// Remove and return the entry at a 0-based `index`.
    pub fn take(&mut self, index: usize) -> Option<Conversation> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Delete entries by 1-based position. Positions that are 0 or out of
    /// range are ignored. Returns how many entries were removed.
    pub fn delete_positions(&mut self, positions: &[usize]) -> usize {
        let before = self.entries.len();
        let mut position = 0;
        self.entries.retain(|_| {
            position += 1;
            !positions.contains(&position)
        });
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[Conversation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict(&mut self) {
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }
}

// ─────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────

/// Storage backend for history. The session needs nothing more.
pub trait HistoryRepository: Send {
    /// Load the stored conversations, oldest first. Missing or unreadable
    /// storage yields an empty list.
    fn load(&self) -> Vec<Conversation>;

    /// Replace the stored conversations.
    fn save(&self, conversations: &[Conversation]) -> std::io::Result<()>;
}

/// History persisted as a single JSON array file.
#[derive(Clone, Debug)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonHistoryFile { path: path.into() }
    }

    /// History file living in the same directory as `config_path`.
    pub fn beside(config_path: &Path) -> Self {
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        JsonHistoryFile::new(dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryRepository for JsonHistoryFile {
    fn load(&self) -> Vec<Conversation> {
        if !self.path.exists() {
            debug!("No history file at {}", self.path.display());
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read history file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Conversation>>(&content) {
            Ok(history) => {
                debug!(
                    "Loaded {} conversations from {}",
                    history.len(),
                    self.path.display()
                );
                history
            }
            Err(e) => {
                warn!("Failed to parse history file {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, conversations: &[Conversation]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(conversations)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(&self.path, json)?;
        debug!(
            "Saved {} conversations to {}",
            conversations.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

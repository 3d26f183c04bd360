//! Session state machine: the single owner of the live conversation.
//!
//! The session holds the canonical message sequence (system message first),
//! the current topic and prompt id, and the bounded history of past
//! conversations. Every provider call goes through the budgeter first.
//! Provider failures never escape a turn: they are recorded as `Error: `
//! assistant messages and returned as [`TurnOutcome::Failed`].

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use inkwell_core::config::Config;
use inkwell_core::history::{HistoryRepository, HistoryStore, JsonHistoryFile};
use inkwell_core::prompts::PromptCatalog;
use inkwell_core::types::{Conversation, Message, Role, DEFAULT_TOPIC};
use inkwell_providers::{create_adapter, ChatError, ChatProvider};

use crate::budget;
use crate::topic;

// ─────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────

/// Errors from session construction and menu operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no conversation at position {position} (history holds {len})")]
    OutOfRange { position: usize, len: usize },

    /// The in-memory change was applied; only the save failed.
    #[error("failed to save history: {0}")]
    Persistence(#[from] std::io::Error),
}

impl From<ChatError> for SessionError {
    fn from(err: ChatError) -> Self {
        SessionError::Configuration(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NoConversation,
    Active,
}

/// Result of one user turn, for the renderer.
#[derive(Debug)]
pub enum TurnOutcome {
    Reply { text: String, host: String },
    Failed { error: ChatError },
}

impl TurnOutcome {
    pub fn is_reply(&self) -> bool {
        matches!(self, TurnOutcome::Reply { .. })
    }
}

/// The slice of [`Config`] the session reads.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub token_limit: u32,
    pub max_history: usize,
    pub prompt: String,
    pub custom_prompt: String,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        SessionSettings {
            token_limit: config.token_limit,
            max_history: config.max_history,
            prompt: config.prompt.clone(),
            custom_prompt: config.custom_prompt.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

pub struct Session {
    provider: Box<dyn ChatProvider>,
    repository: Box<dyn HistoryRepository>,
    history: HistoryStore,
    catalog: PromptCatalog,
    settings: SessionSettings,
    messages: Vec<Message>,
    topic: String,
    prompt_id: String,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider.display_name())
            .field("state", &self.state)
            .field("topic", &self.topic)
            .field("messages", &self.messages.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl Session {
    /// Assemble a session from its collaborators. History is loaded from the
    /// repository unless `max_history` is 0.
    pub fn new(
        provider: Box<dyn ChatProvider>,
        repository: Box<dyn HistoryRepository>,
        catalog: PromptCatalog,
        settings: SessionSettings,
    ) -> Self {
        let entries = if settings.max_history > 0 {
            repository.load()
        } else {
            Vec::new()
        };
        let history = HistoryStore::from_entries(entries, settings.max_history);
        debug!(
            provider = %provider.display_name(),
            history = history.len(),
            prompts = catalog.len(),
            "session created"
        );

        Session {
            provider,
            repository,
            history,
            catalog,
            settings,
            messages: Vec::new(),
            topic: DEFAULT_TOPIC.to_string(),
            prompt_id: String::new(),
            state: SessionState::NoConversation,
        }
    }

    /// Build the adapter, history file, and prompt catalog for a config file.
    pub fn from_config(config: &Config, config_path: &Path) -> Result<Self, SessionError> {
        let adapter = create_adapter(config)?;
        let repository = JsonHistoryFile::beside(config_path);
        let catalog = PromptCatalog::load(&PromptCatalog::path_beside(config_path));

        Ok(Session::new(
            Box::new(adapter),
            Box::new(repository),
            catalog,
            SessionSettings::from(config),
        ))
    }

    // ─── Lifecycle ───

    /// Begin a fresh conversation: one system message, sentinel topic.
    pub fn start(&mut self) {
        self.prompt_id = self
            .catalog
            .select(&self.settings.prompt, &self.settings.custom_prompt);
        self.messages = vec![self.system_message(&self.prompt_id)];
        self.topic = DEFAULT_TOPIC.to_string();
        self.state = SessionState::Active;
        debug!(prompt = %self.prompt_id, "conversation started");
    }

    /// Flush the active conversation (if it has a topic) and start over.
    pub fn new_conversation(&mut self) -> Result<(), SessionError> {
        let flushed = self.flush();
        self.start();
        flushed.map(|_| ())
    }

    /// Make the history entry at 1-based `position` the active conversation.
    ///
    /// The entry leaves history; the previously active conversation is
    /// flushed into it.
    pub fn switch_conversation(&mut self, position: usize) -> Result<(), SessionError> {
        let len = self.history.len();
        let entry = position
            .checked_sub(1)
            .and_then(|index| self.history.take(index))
            .ok_or(SessionError::OutOfRange { position, len })?;

        let flushed = self.flush();

        info!(topic = %entry.topic, "switching conversation");
        let mut messages = Vec::with_capacity(entry.messages.len() + 1);
        messages.push(self.system_message(&entry.prompt_id));
        messages.extend(entry.messages);
        self.messages = messages;
        self.topic = entry.topic;
        self.prompt_id = entry.prompt_id;
        self.state = SessionState::Active;

        // The entry left history even when nothing was flushed.
        match flushed {
            Ok(false) => self.persist(),
            other => other.map(|_| ()),
        }
    }

    /// Delete history entries by 1-based position. Position 0 discards the
    /// active conversation instead. Returns how many history entries went.
    pub fn delete_conversations(&mut self, positions: &[usize]) -> Result<usize, SessionError> {
        if positions.contains(&0) {
            info!(topic = %self.topic, "discarding active conversation");
            self.topic = DEFAULT_TOPIC.to_string();
            self.messages.truncate(1);
        }

        let removed = self.history.delete_positions(positions);
        if removed > 0 {
            info!(removed, "history entries deleted");
            self.persist()?;
        }
        Ok(removed)
    }

    /// Conversations picked for export by 1-based history position. A lone
    /// `0` picks the active conversation instead.
    pub fn export_selection(&self, positions: &[usize]) -> Vec<Conversation> {
        if positions == [0] {
            return vec![Conversation::new(
                self.topic.clone(),
                self.prompt_id.clone(),
                self.messages.iter().skip(1).cloned().collect(),
            )];
        }
        self.history
            .entries()
            .iter()
            .enumerate()
            .filter(|(i, _)| positions.contains(&(i + 1)))
            .map(|(_, conversation)| conversation.clone())
            .collect()
    }

    /// Flush the active conversation and leave the session idle.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        let flushed = self.flush();
        self.state = SessionState::NoConversation;
        flushed.map(|_| ())
    }

    // ─── Turns ───

    /// Run one user turn.
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        if self.state == SessionState::NoConversation {
            self.start();
        }

        self.messages.push(Message::user(text));
        match self.messages.len() {
            2 => self.topic = topic::topic_from_first_turn(text),
            4 => self.summarize_topic().await,
            _ => {}
        }

        let outgoing = budget::trim(&self.messages, self.budget_bytes());
        debug!(
            messages = self.messages.len(),
            sent = outgoing.len(),
            "submitting turn"
        );

        match self.provider.chat(&outgoing).await {
            Ok(reply) => {
                let text = reply.text.trim().to_string();
                self.messages.push(Message::assistant(text.clone()));
                TurnOutcome::Reply {
                    text,
                    host: reply.host,
                }
            }
            Err(error) => {
                warn!(error = %error, "turn failed");
                self.messages.push(Message::failure(&error));
                TurnOutcome::Failed { error }
            }
        }
    }

    /// Submit the most recent user turn again as a new turn.
    pub async fn replay_last(&mut self) -> Option<TurnOutcome> {
        let text = self
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())?;
        debug!("replaying last user turn");
        Some(self.submit(&text).await)
    }

    async fn summarize_topic(&mut self) {
        let mut request = self.messages.clone();
        request.push(Message::user(topic::TOPIC_PROMPT));
        let request = budget::trim(&request, self.budget_bytes());

        match self.provider.chat(&request).await {
            Ok(reply) => {
                let summary = topic::clean_summary(&reply.text);
                if summary.is_empty() {
                    debug!("empty summary, keeping topic");
                } else {
                    debug!(topic = %summary, "topic summarized");
                    self.topic = summary;
                }
            }
            Err(e) => warn!(error = %e, "topic summarization failed, keeping topic"),
        }
    }

    // ─── Accessors ───

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn prompt_id(&self) -> &str {
        &self.prompt_id
    }

    /// The live message sequence, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn provider_name(&self) -> String {
        self.provider.display_name()
    }

    // ─── Internals ───

    fn budget_bytes(&self) -> usize {
        budget::budget_bytes(self.settings.token_limit)
    }

    fn system_message(&self, prompt_id: &str) -> Message {
        Message::system(
            self.catalog
                .resolve(prompt_id, &self.settings.custom_prompt),
        )
    }

    /// Move the active conversation into history and save. Sentinel-topic
    /// conversations are never stored. `Ok(true)` when something was stored.
    fn flush(&mut self) -> Result<bool, SessionError> {
        if self.state != SessionState::Active || self.topic == DEFAULT_TOPIC {
            return Ok(false);
        }
        let conversation = Conversation::new(
            self.topic.clone(),
            self.prompt_id.clone(),
            self.messages.iter().skip(1).cloned().collect(),
        );
        debug!(topic = %conversation.topic, messages = conversation.messages.len(), "flushing conversation");
        self.history.append(conversation);
        self.persist().map(|_| true)
    }

    fn persist(&self) -> Result<(), SessionError> {
        if self.history.capacity() == 0 {
            return Ok(());
        }
        self.repository.save(self.history.entries()).map_err(|e| {
            warn!("Failed to save history: {}", e);
            SessionError::Persistence(e)
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inkwell_core::prompts::DEFAULT_INSTRUCTIONS;
    use inkwell_providers::ChatReply;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Provider double that replays scripted results and records every call.
    struct ScriptedProvider {
        replies: VecDeque<Result<String, ChatError>>,
        calls: Arc<Mutex<Vec<Vec<Message>>>>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(&mut self, messages: &[Message]) -> Result<ChatReply, ChatError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            match self.replies.pop_front() {
                Some(Ok(text)) => Ok(ChatReply {
                    text,
                    host: "mock.example.com".to_string(),
                }),
                Some(Err(e)) => Err(e),
                None => Ok(ChatReply {
                    text: "(no more replies)".to_string(),
                    host: "mock.example.com".to_string(),
                }),
            }
        }

        fn display_name(&self) -> String {
            "mock/model".to_string()
        }
    }

    #[derive(Clone, Default)]
    struct MemoryRepository {
        stored: Arc<Mutex<Vec<Conversation>>>,
        saves: Arc<Mutex<usize>>,
    }

    impl HistoryRepository for MemoryRepository {
        fn load(&self) -> Vec<Conversation> {
            self.stored.lock().unwrap().clone()
        }

        fn save(&self, conversations: &[Conversation]) -> std::io::Result<()> {
            *self.stored.lock().unwrap() = conversations.to_vec();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct Harness {
        session: Session,
        calls: Arc<Mutex<Vec<Vec<Message>>>>,
        repository: MemoryRepository,
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            token_limit: 4000,
            max_history: 10,
            prompt: "default".to_string(),
            custom_prompt: String::new(),
        }
    }

    fn harness_with(
        replies: Vec<Result<&str, ChatError>>,
        settings: SessionSettings,
        catalog: PromptCatalog,
        stored: Vec<Conversation>,
    ) -> Harness {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            replies: replies.into_iter().map(|r| r.map(String::from)).collect(),
            calls: calls.clone(),
        };
        let repository = MemoryRepository::default();
        *repository.stored.lock().unwrap() = stored;

        let mut session = Session::new(
            Box::new(provider),
            Box::new(repository.clone()),
            catalog,
            settings,
        );
        session.start();
        Harness {
            session,
            calls,
            repository,
        }
    }

    fn harness(replies: Vec<Result<&str, ChatError>>) -> Harness {
        harness_with(replies, settings(), PromptCatalog::default(), Vec::new())
    }

    fn stored_conversation(topic: &str) -> Conversation {
        Conversation::new(
            topic,
            "default",
            vec![Message::user(topic), Message::assistant("ok")],
        )
    }

    // ─── Lifecycle ───

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new(
            Box::new(ScriptedProvider {
                replies: VecDeque::new(),
                calls: Arc::default(),
            }),
            Box::new(MemoryRepository::default()),
            PromptCatalog::default(),
            settings(),
        );
        assert_eq!(session.state(), SessionState::NoConversation);
        assert_eq!(session.provider_name(), "mock/model");
    }

    #[test]
    fn test_start_resets_to_system_message() {
        let h = harness(vec![]);
        assert_eq!(h.session.state(), SessionState::Active);
        assert_eq!(h.session.topic(), DEFAULT_TOPIC);
        assert_eq!(h.session.prompt_id(), "default");
        assert_eq!(h.session.messages(), &[Message::system(DEFAULT_INSTRUCTIONS)]);
    }

    #[test]
    fn test_start_prefers_custom_prompt() {
        let mut s = settings();
        s.prompt = "poet".to_string();
        s.custom_prompt = "Be a pirate.".to_string();
        let catalog = PromptCatalog::parse("poet\nRhyme everything.");
        let h = harness_with(vec![], s, catalog, Vec::new());

        assert_eq!(h.session.prompt_id(), "custom");
        assert_eq!(h.session.messages()[0].content, "Be a pirate.");
    }

    #[test]
    fn test_start_uses_catalog_preset() {
        let mut s = settings();
        s.prompt = "poet".to_string();
        let catalog = PromptCatalog::parse("poet\nRhyme everything.");
        let h = harness_with(vec![], s, catalog, Vec::new());

        assert_eq!(h.session.prompt_id(), "poet");
        assert_eq!(h.session.messages()[0].content, "Rhyme everything.");
    }

    #[test]
    fn test_history_loaded_and_capped() {
        let stored: Vec<Conversation> = (1..=4)
            .map(|i| stored_conversation(&format!("topic {i}")))
            .collect();
        let mut s = settings();
        s.max_history = 3;
        let h = harness_with(vec![], s, PromptCatalog::default(), stored);

        let topics: Vec<&str> = h.session.history().entries().iter().map(|c| c.topic.as_str()).collect();
        assert_eq!(topics, vec!["topic 2", "topic 3", "topic 4"]);
    }

    // ─── Turns ───

    #[tokio::test]
    async fn test_first_turn_sets_topic_and_reply() {
        let mut h = harness(vec![Ok("  Hi there!  ")]);

        let outcome = h.session.submit("hello world this is a test message").await;

        match outcome {
            TurnOutcome::Reply { text, host } => {
                assert_eq!(text, "Hi there!");
                assert_eq!(host, "mock.example.com");
            }
            other => panic!("expected reply, got {other:?}"),
        }
        assert_eq!(h.session.topic(), "hello world this is a test");
        assert_eq!(h.session.messages().len(), 3);
        assert_eq!(h.session.messages()[2], Message::assistant("Hi there!"));
    }

    #[tokio::test]
    async fn test_submit_starts_idle_session() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut session = Session::new(
            Box::new(ScriptedProvider {
                replies: VecDeque::from(vec![Ok("hi".to_string())]),
                calls: calls.clone(),
            }),
            Box::new(MemoryRepository::default()),
            PromptCatalog::default(),
            settings(),
        );

        assert!(session.submit("hello").await.is_reply());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(calls.lock().unwrap()[0][0].role, Role::System);
    }

    #[tokio::test]
    async fn test_second_round_trip_summarizes_topic() {
        let mut h = harness(vec![Ok("first reply"), Ok("`rust ownership tips`\n"), Ok("second reply")]);

        h.session.submit("tell me about rust").await;
        h.session.submit("and ownership?").await;

        assert_eq!(h.session.topic(), "rust ownership tips");
        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        let request = &calls[1];
        assert_eq!(request.last().unwrap(), &Message::user(topic::TOPIC_PROMPT));
        assert_eq!(request.len(), 5);
        // The summarization exchange is not part of the conversation.
        assert_eq!(h.session.messages().len(), 5);
        assert_eq!(h.session.messages()[4], Message::assistant("second reply"));
    }

    #[tokio::test]
    async fn test_failed_summary_keeps_topic() {
        let mut h = harness(vec![
            Ok("first reply"),
            Err(ChatError::malformed("missing completion")),
            Ok("second reply"),
        ]);

        h.session.submit("plan a weekend trip").await;
        let outcome = h.session.submit("somewhere warm").await;

        assert!(outcome.is_reply());
        assert_eq!(h.session.topic(), "plan a weekend trip");
    }

    #[tokio::test]
    async fn test_failed_turn_is_recorded_and_not_replayed_to_vendor() {
        let mut h = harness(vec![
            Err(ChatError::Provider {
                status: 500,
                reason: "Internal Server Error".to_string(),
                body: "boom".to_string(),
            }),
            Ok("summary"),
            Ok("recovered"),
        ]);

        let outcome = h.session.submit("hello").await;
        assert!(matches!(
            outcome,
            TurnOutcome::Failed {
                error: ChatError::Provider { status: 500, .. }
            }
        ));
        let failure = &h.session.messages()[2];
        assert!(failure.is_failure());
        assert!(failure.content.contains("HTTP 500"));

        h.session.submit("again").await;
        let calls = h.calls.lock().unwrap();
        let last = calls.last().unwrap();
        assert_eq!(last[2], Message::assistant(""));
        assert_eq!(last[3], Message::user("again"));
    }

    #[tokio::test]
    async fn test_outgoing_messages_are_budgeted() {
        let mut s = settings();
        s.token_limit = 1000;
        let mut h = harness_with(vec![Ok("a"), Ok("b"), Ok("c")], s, PromptCatalog::default(), Vec::new());

        h.session.submit(&"x".repeat(4000)).await;
        h.session.submit("short").await;

        let calls = h.calls.lock().unwrap();
        let last = calls.last().unwrap();
        assert_eq!(last[0].role, Role::System);
        assert!(last.iter().all(|m| m.content.len() < 4000));
        assert_eq!(last.last().unwrap(), &Message::user("short"));
        // The live sequence keeps everything.
        assert_eq!(h.session.messages()[1].content.len(), 4000);
    }

    #[tokio::test]
    async fn test_replay_last_resubmits_user_turn() {
        let mut h = harness(vec![Ok("one"), Ok("summary"), Ok("two")]);

        assert!(h.session.replay_last().await.is_none());

        h.session.submit("what time is it").await;
        let outcome = h.session.replay_last().await.unwrap();

        assert!(outcome.is_reply());
        let users: Vec<&str> = h
            .session
            .messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(users, vec!["what time is it", "what time is it"]);
    }

    // ─── History operations ───

    #[tokio::test]
    async fn test_new_conversation_flushes_and_persists() {
        let mut h = harness(vec![Ok("hi")]);
        h.session.submit("hello there").await;

        h.session.new_conversation().unwrap();

        assert_eq!(h.session.topic(), DEFAULT_TOPIC);
        assert_eq!(h.session.messages().len(), 1);
        let stored = h.repository.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "hello there");
        assert_eq!(
            stored[0].messages,
            vec![Message::user("hello there"), Message::assistant("hi")]
        );
    }

    #[test]
    fn test_new_conversation_twice_stores_nothing() {
        let mut h = harness(vec![]);
        h.session.new_conversation().unwrap();
        h.session.new_conversation().unwrap();

        assert!(h.session.history().is_empty());
        assert_eq!(*h.repository.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_continued_conversation_merges() {
        let stored = vec![stored_conversation("older")];
        // An unusable summary keeps the stored topic.
        let mut h = harness_with(vec![Ok("``"), Ok("more")], settings(), PromptCatalog::default(), stored);

        h.session.switch_conversation(1).unwrap();
        h.session.submit("follow up").await;
        h.session.new_conversation().unwrap();

        let history = h.session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].topic, "older");
        assert_eq!(history.entries()[0].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_switch_conversation() {
        let stored = vec![stored_conversation("first"), stored_conversation("second")];
        let mut h = harness_with(vec![Ok("hi")], settings(), PromptCatalog::default(), stored);
        h.session.submit("current chat").await;

        h.session.switch_conversation(1).unwrap();

        assert_eq!(h.session.topic(), "first");
        assert_eq!(h.session.messages()[0], Message::system(DEFAULT_INSTRUCTIONS));
        assert_eq!(&h.session.messages()[1..], stored_conversation("first").messages.as_slice());

        let topics: Vec<String> = h
            .repository
            .stored
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.topic.clone())
            .collect();
        assert_eq!(topics, vec!["second", "current chat"]);
        assert_eq!(*h.repository.saves.lock().unwrap(), 1);
    }

    #[test]
    fn test_switch_without_flush_still_saves_once() {
        let stored = vec![stored_conversation("first"), stored_conversation("second")];
        let mut h = harness_with(vec![], settings(), PromptCatalog::default(), stored);

        h.session.switch_conversation(2).unwrap();

        assert_eq!(*h.repository.saves.lock().unwrap(), 1);
        let stored = h.repository.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "first");
    }

    #[test]
    fn test_switch_restores_prompt_of_entry() {
        let mut s = settings();
        s.custom_prompt = "Be a pirate.".to_string();
        let catalog = PromptCatalog::parse("poet\nRhyme everything.");
        let stored = vec![Conversation::new("verses", "poet", vec![Message::user("a poem")])];
        let mut h = harness_with(vec![], s, catalog, stored);

        h.session.switch_conversation(1).unwrap();

        assert_eq!(h.session.prompt_id(), "poet");
        assert_eq!(h.session.messages()[0].content, "Rhyme everything.");
        // A sentinel conversation is not flushed on the way out.
        assert!(h.session.history().is_empty());
    }

    #[test]
    fn test_switch_out_of_range() {
        let mut h = harness_with(vec![], settings(), PromptCatalog::default(), vec![stored_conversation("only")]);

        for position in [0, 2] {
            match h.session.switch_conversation(position).unwrap_err() {
                SessionError::OutOfRange { position: p, len } => {
                    assert_eq!(p, position);
                    assert_eq!(len, 1);
                }
                other => panic!("expected out of range, got {other:?}"),
            }
        }
        assert_eq!(h.session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_zero_discards_active() {
        let mut h = harness(vec![Ok("hi")]);
        h.session.submit("something worth keeping").await;

        let removed = h.session.delete_conversations(&[0]).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(h.session.topic(), DEFAULT_TOPIC);
        assert_eq!(h.session.messages(), &[Message::system(DEFAULT_INSTRUCTIONS)]);

        // Nothing to flush afterwards.
        h.session.quit().unwrap();
        assert!(h.session.history().is_empty());
    }

    #[test]
    fn test_delete_positions() {
        let stored: Vec<Conversation> = ["a", "b", "c"].iter().map(|t| stored_conversation(t)).collect();
        let mut h = harness_with(vec![], settings(), PromptCatalog::default(), stored);

        let removed = h.session.delete_conversations(&[1, 3, 9]).unwrap();

        assert_eq!(removed, 2);
        let stored = h.repository.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "b");
    }

    #[tokio::test]
    async fn test_export_selection_active() {
        let mut h = harness(vec![Ok("hi")]);
        h.session.submit("export me").await;

        let picked = h.session.export_selection(&[0]);

        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].topic, "export me");
        assert_eq!(
            picked[0].messages,
            vec![Message::user("export me"), Message::assistant("hi")]
        );
    }

    #[test]
    fn test_export_selection_history_positions() {
        let stored: Vec<Conversation> = ["a", "b", "c"].iter().map(|t| stored_conversation(t)).collect();
        let h = harness_with(vec![], settings(), PromptCatalog::default(), stored);

        let topics: Vec<String> = h
            .session
            .export_selection(&[0, 1, 3, 7])
            .into_iter()
            .map(|c| c.topic)
            .collect();
        assert_eq!(topics, vec!["a", "c"]);
        assert!(h.session.export_selection(&[9]).is_empty());
        // Selecting does not touch history.
        assert_eq!(h.session.history().len(), 3);
    }

    #[tokio::test]
    async fn test_quit_flushes() {
        let mut h = harness(vec![Ok("hi")]);
        h.session.submit("remember this").await;

        h.session.quit().unwrap();

        assert_eq!(h.session.state(), SessionState::NoConversation);
        assert_eq!(h.repository.stored.lock().unwrap()[0].topic, "remember this");
    }

    #[tokio::test]
    async fn test_zero_history_never_saves() {
        let mut s = settings();
        s.max_history = 0;
        let mut h = harness_with(vec![Ok("hi")], s, PromptCatalog::default(), vec![stored_conversation("old")]);

        assert!(h.session.history().is_empty());
        h.session.submit("hello").await;
        h.session.quit().unwrap();

        assert_eq!(*h.repository.saves.lock().unwrap(), 0);
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let config = Config {
            provider: "acme".to_string(),
            ..Default::default()
        };
        let err = Session::from_config(&config, Path::new("/tmp/inkwell/config.json")).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }
}

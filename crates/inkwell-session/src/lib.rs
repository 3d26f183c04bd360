//! Inkwell session: everything between the REPL and the provider.
//!
//! - [`budget`]: trims the outgoing message sequence to the token budget
//! - [`topic`]: conversation titles, from the first turn or from the model
//! - [`session`]: the conversation state machine

pub mod budget;
pub mod session;
pub mod topic;

pub use session::{Session, SessionError, SessionSettings, SessionState, TurnOutcome};

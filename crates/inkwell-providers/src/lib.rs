//! Provider layer for Inkwell.
//!
//! # Architecture
//!
//! - [`registry`]: static catalog of vendors, hosts, and models
//! - [`pool::ConnectionPool`]: round-robin endpoints with one retry on a broken connection
//! - [`wire`]: payload builders and reply extraction for each protocol family
//! - [`adapter::ProtocolAdapter`]: the [`ChatProvider`] bound to one vendor family per session
//! - [`error::ChatError`]: configuration / transport / provider / malformed-response failures

pub mod adapter;
pub mod error;
pub mod pool;
pub mod registry;
pub mod traits;
pub mod wire;

pub use adapter::{create_adapter, ProtocolAdapter};
pub use error::ChatError;
pub use pool::{ConnectionPool, Endpoint, RawResponse};
pub use registry::{ModelSpec, ProtocolFamily, ProviderDescriptor, PROVIDERS};
pub use traits::{ChatProvider, ChatReply};

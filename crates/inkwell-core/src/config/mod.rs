//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use inkwell_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Provider: {}/{}", cfg.provider, cfg.model);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{ChatMode, Config, MIN_TOKEN_LIMIT};

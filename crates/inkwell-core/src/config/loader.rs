//! Config loader: reads `~/.inkwell/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.inkwell/config.json` (or `--config FILE`)
//! 3. Environment variables `INKWELL_<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{ChatMode, Config};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path)).normalize()
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// - `INKWELL_PROVIDER`, `INKWELL_MODEL`, `INKWELL_API_KEY`, `INKWELL_API_HOST`
/// - `INKWELL_TOKEN_LIMIT`, `INKWELL_MAX_HISTORY` (ignored unless numeric)
/// - `INKWELL_CHAT_MODE` (`multi_turn` | `single_turn`)
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("INKWELL_PROVIDER") {
        config.provider = val;
    }
    if let Ok(val) = std::env::var("INKWELL_MODEL") {
        config.model = val;
    }
    if let Ok(val) = std::env::var("INKWELL_API_KEY") {
        config.api_key = val;
    }
    if let Ok(val) = std::env::var("INKWELL_API_HOST") {
        config.api_host = val;
    }
    if let Ok(val) = std::env::var("INKWELL_TOKEN_LIMIT") {
        if let Ok(n) = val.parse::<u32>() {
            config.token_limit = n;
        }
    }
    if let Ok(val) = std::env::var("INKWELL_MAX_HISTORY") {
        if let Ok(n) = val.parse::<usize>() {
            config.max_history = n;
        }
    }
    if let Ok(val) = std::env::var("INKWELL_CHAT_MODE") {
        match val.parse::<ChatMode>() {
            Ok(mode) => config.chat_mode = mode,
            Err(e) => warn!("Ignoring INKWELL_CHAT_MODE: {}", e),
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.provider, "google");
        assert_eq!(config.token_limit, 4000);
        assert_eq!(config.max_history, 10);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "provider": "openai",
            "model": "gpt-4o",
            "apiKey": "sk-test",
            "apiHost": "a.example.com;b.example.com",
            "chatMode": "single_turn"
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.chat_mode, ChatMode::SingleTurn);
        // Default preserved
        assert_eq!(config.max_history, 10);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_applies_token_floor() {
        let file = write_temp_json(r#"{"tokenLimit": 200}"#);
        let config = load_config(Some(file.path()));
        assert_eq!(config.token_limit, 1000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            provider: "groq".to_string(),
            api_key: "gsk-test".to_string(),
            custom_prompt: "Be terse.".to_string(),
            ..Default::default()
        };

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw.get("tokenLimit").is_some());
        assert!(raw.get("token_limit").is_none());
        assert_eq!(raw["chatMode"], "multi_turn");
    }

    #[test]
    fn test_env_override_model_and_mode() {
        std::env::set_var("INKWELL_MODEL", "test-model");
        std::env::set_var("INKWELL_CHAT_MODE", "single_turn");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.model, "test-model");
        assert_eq!(config.chat_mode, ChatMode::SingleTurn);
        std::env::remove_var("INKWELL_MODEL");
        std::env::remove_var("INKWELL_CHAT_MODE");
    }

    #[test]
    fn test_env_override_ignores_non_numeric() {
        std::env::set_var("INKWELL_MAX_HISTORY", "lots");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.max_history, 10);
        std::env::remove_var("INKWELL_MAX_HISTORY");
    }
}

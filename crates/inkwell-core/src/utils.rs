//! Utility helpers: path resolution and string trimming.

use std::path::PathBuf;

/// Get the Inkwell data directory (e.g. `~/.inkwell/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".inkwell")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if path.starts_with("~/") || path == "~" {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(path.get(2..).unwrap_or_default())
    } else {
        PathBuf::from(path)
    }
}

/// Keep at most `max_chars` characters. Unicode-safe, no ellipsis.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chars_short() {
        assert_eq!(take_chars("hello", 30), "hello");
    }

    #[test]
    fn test_take_chars_unicode() {
        assert_eq!(take_chars("こんにちは世界", 3), "こんに");
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/test/path");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.to_str().unwrap().ends_with("test/path"));
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_data_path_ends_with_inkwell() {
        assert!(get_data_path().ends_with(".inkwell"));
    }
}

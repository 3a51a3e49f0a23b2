//! Startup configuration. Resolved once; nothing here is reloaded at runtime.

use std::env;
use std::path::PathBuf;

use crate::data::shop::DEFAULT_DATA_PATH;

pub const DATA_PATH_ENV: &str = "FOODMAP_DATA";
pub const BIND_ENV: &str = "FOODMAP_BIND";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub bind_addr: String,
}

impl AppConfig {
    /// Explicit path wins over `FOODMAP_DATA`, which wins over the default.
    pub fn resolve(data_path: Option<PathBuf>) -> Self {
        Self::resolve_with(data_path, |key| env::var(key).ok())
    }

    fn resolve_with(data_path: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = data_path
            .or_else(|| non_blank(lookup(DATA_PATH_ENV)).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let bind_addr =
            non_blank(lookup(BIND_ENV)).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        Self {
            data_path,
            bind_addr,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = AppConfig::resolve_with(None, |_| None);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn explicit_path_beats_environment() {
        let lookup = |key: &str| match key {
            DATA_PATH_ENV => Some("/env/shops.json".to_string()),
            BIND_ENV => Some(" 0.0.0.0:9000 ".to_string()),
            _ => None,
        };
        let from_env = AppConfig::resolve_with(None, lookup);
        assert_eq!(from_env.data_path, PathBuf::from("/env/shops.json"));
        assert_eq!(from_env.bind_addr, "0.0.0.0:9000");

        let explicit = AppConfig::resolve_with(Some(PathBuf::from("mine.json")), lookup);
        assert_eq!(explicit.data_path, PathBuf::from("mine.json"));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let config = AppConfig::resolve_with(None, |_| Some("   ".to_string()));
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}

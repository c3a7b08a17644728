use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::store::DEFAULT_PAGE_SIZE;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8085/api";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub page_size: usize,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl_secs: 60,
            request_timeout_secs: 30,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Load the config file; a missing or malformed file yields defaults
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

fn parse(content: &str) -> Config {
    match toml::from_str::<Config>(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SCREENER_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("screener").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("screener").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "screener", "screener")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("screener"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("screener"));
    }
    directories::ProjectDirs::from("io", "screener", "screener")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("screener.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse("backend_url = \"https://api.example.com/api\"\npage_size = 25\n");
        assert_eq!(config.backend_url, "https://api.example.com/api");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.export_dir, None);
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        assert_eq!(parse("page_size = \"many\""), Config::default());
        assert_eq!(parse("not toml at all ["), Config::default());
    }
}

//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default remote request timeout, in milliseconds.
fn default_request_timeout_ms() -> u64 {
    20_000
}

/// Default history file location.
fn default_history_path() -> PathBuf {
    PathBuf::from(".hidden/chat_history.json")
}

/// Default number of messages kept in history.
fn default_history_limit() -> usize {
    300
}

/// Configuration for the query-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner: Arc::new(ConfigInner::default()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Remote chat endpoint, e.g. `http://localhost:5000/chat` (`CHAT_ENDPOINT`).
    /// When unset, every reply comes from the offline responder.
    #[serde(default)]
    pub chat_endpoint: Option<String>,
    /// Timeout for a single remote call, in milliseconds (`REQUEST_TIMEOUT_MS`).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Where the chat history is persisted (`HISTORY_PATH`).
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Maximum number of messages kept in history (`HISTORY_LIMIT`).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            chat_endpoint: None,
            request_timeout_ms: default_request_timeout_ms(),
            history_path: default_history_path(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("QUERY_BOT").prefix_separator("_"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.request_timeout_ms < 1 || self.request_timeout_ms > 600_000 {
            return Err(anyhow::anyhow!("Request timeout must be between 1 and 600000 milliseconds."));
        }

        if self.history_limit < 1 {
            return Err(anyhow::anyhow!("History limit must be at least 1."));
        }

        if let Some(endpoint) = &self.chat_endpoint
            && endpoint.trim().is_empty()
        {
            return Err(anyhow::anyhow!("Chat endpoint must not be blank when set."));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.chat_endpoint, None);
        assert_eq!(config.request_timeout_ms, 20_000);
        assert_eq!(config.history_limit, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "chat_endpoint = \"http://localhost:5000/chat\"").unwrap();
        writeln!(file, "request_timeout_ms = 1500").unwrap();
        writeln!(file, "history_limit = 10").unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.chat_endpoint.as_deref(), Some("http://localhost:5000/chat"));
        assert_eq!(config.request_timeout_ms, 1500);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.history_path, PathBuf::from(".hidden/chat_history.json"));
    }

    #[test]
    fn test_load_wraps_shared_inner() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_ms = 250").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        let clone = config.clone();

        assert!(Arc::ptr_eq(&config.inner, &clone.inner));
        assert_eq!(clone.request_timeout_ms, 250);
    }

    #[test]
    fn test_rejects_zero_history_limit() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "history_limit = 0").unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        let config = Config {
            inner: Arc::new(ConfigInner {
                request_timeout_ms: 0,
                ..Default::default()
            }),
        };

        assert!(config.validate().is_err());
    }
}

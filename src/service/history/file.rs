//! JSON file implementation for chat history storage.

use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{ChatMessage, Res, Void},
};

use super::{GenericHistoryStore, HistoryStore};

// Extra methods on `HistoryStore` applied by the file implementation.

impl HistoryStore {
    /// Creates a history store backed by the configured JSON file.
    pub fn file(config: &Config) -> Self {
        let store = JsonFileHistoryStore::new(config.history_path.clone(), config.history_limit);
        Self { inner: Arc::new(store) }
    }
}

// Specific implementations.

/// Stores the thread as a JSON array of messages in a single file.
#[derive(Clone, Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    limit: usize,
}

impl JsonFileHistoryStore {
    pub fn new(path: PathBuf, limit: usize) -> Self {
        Self { path, limit }
    }
}

#[async_trait]
impl GenericHistoryStore for JsonFileHistoryStore {
    #[instrument(name = "JsonFileHistoryStore::load", skip(self))]
    async fn load(&self) -> Res<Vec<ChatMessage>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history file at `{}`.", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(anyhow!("Could not read `{}`: {}", self.path.display(), e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let messages: Vec<ChatMessage> = serde_json::from_str(&raw)?;

        Ok(messages)
    }

    #[instrument(name = "JsonFileHistoryStore::save", skip_all)]
    async fn save(&self, messages: &[ChatMessage]) -> Void {
        let start = messages.len().saturating_sub(self.limit);
        let json = serde_json::to_string(&messages[start..])?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, json).await?;

        debug!("Saved {} messages to `{}`.", messages.len() - start, self.path.display());

        Ok(())
    }
}

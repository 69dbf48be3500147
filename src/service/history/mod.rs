//! Chat history persistence and transcript export.

use std::{ops::Deref, path::Path, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::base::{
    replies::EMPTY_HISTORY_MESSAGE,
    types::{ChatMessage, Res, Void, format_time},
};

pub mod file;

// Traits.

/// Generic history store trait that backends must implement.
///
/// This trait defines how the chat thread is persisted between sessions. Implementing
/// this trait allows different storage backends to be used by the client.
#[async_trait]
pub trait GenericHistoryStore: Send + Sync + 'static {
    /// Load the persisted thread, oldest message first.
    ///
    /// A store that has never been written loads as an empty thread.
    async fn load(&self) -> Res<Vec<ChatMessage>>;

    /// Replace the persisted thread with `messages`.
    async fn save(&self, messages: &[ChatMessage]) -> Void;
}

// Structs.

/// History store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<dyn GenericHistoryStore>,
}

impl Deref for HistoryStore {
    type Target = dyn GenericHistoryStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl HistoryStore {
    pub fn new(inner: Arc<dyn GenericHistoryStore>) -> Self {
        Self { inner }
    }
}

/// The in-memory chat thread, written through to a [`HistoryStore`] on every change.
///
/// Only the most recent `limit` messages are retained.
pub struct History {
    store: HistoryStore,
    limit: usize,
    messages: Vec<ChatMessage>,
}

impl History {
    /// Load the thread from `store`.
    ///
    /// A store that cannot be read is logged and treated as an empty thread.
    #[instrument(name = "History::load", skip_all)]
    pub async fn load(store: HistoryStore, limit: usize) -> Self {
        let messages = match store.load().await {
            Ok(messages) => messages,
            Err(err) => {
                warn!("Could not load history: {}", err);
                Vec::new()
            }
        };

        info!("Loaded {} messages from history.", messages.len());

        let mut history = Self { store, limit, messages };
        history.truncate();

        history
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Append a message and persist.
    pub async fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.persist().await;
    }

    /// Remove the message with `id` and persist. Returns whether a message was removed.
    pub async fn delete(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);

        let removed = self.messages.len() != before;
        if removed {
            self.persist().await;
        }

        removed
    }

    /// Remove every message and persist.
    pub async fn clear(&mut self) {
        self.messages.clear();
        self.persist().await;
    }

    fn truncate(&mut self) {
        if self.messages.len() > self.limit {
            let excess = self.messages.len() - self.limit;
            self.messages.drain(..excess);
        }
    }

    async fn persist(&mut self) {
        self.truncate();

        if let Err(err) = self.store.save(&self.messages).await {
            warn!("Could not save history: {}", err);
        }
    }
}

// Transcript export.

/// Render messages as `[H:MM] SENDER: text` lines.
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    messages.iter().map(|m| format!("[{}] {}: {}", format_time(m.ts), m.sender.label(), m.text)).collect::<Vec<_>>().join("\n")
}

/// Write the transcript of `messages` to `path`.
#[instrument(skip(messages))]
pub async fn export_transcript(messages: &[ChatMessage], path: &Path) -> Void {
    if messages.is_empty() {
        return Err(anyhow!(EMPTY_HISTORY_MESSAGE));
    }

    tokio::fs::write(path, format_transcript(messages)).await.map_err(|e| anyhow!("Could not write `{}`: {}", path.display(), e))?;

    info!("Exported {} messages.", messages.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use tokio::sync::Mutex;

    use super::*;
    use crate::base::types::{Sender, format_time};

    /// Store that keeps the last saved thread in memory.
    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl GenericHistoryStore for MemoryStore {
        async fn load(&self) -> Res<Vec<ChatMessage>> {
            Ok(self.saved.lock().await.clone())
        }

        async fn save(&self, messages: &[ChatMessage]) -> Void {
            *self.saved.lock().await = messages.to_vec();
            Ok(())
        }
    }

    mock! {
        pub Store {}

        #[async_trait]
        impl GenericHistoryStore for Store {
            async fn load(&self) -> Res<Vec<ChatMessage>>;
            async fn save(&self, messages: &[ChatMessage]) -> Void;
        }
    }

    fn message(sender: Sender, text: &str, ts: i64) -> ChatMessage {
        ChatMessage {
            id: format!("id-{ts}"),
            sender,
            text: text.to_string(),
            ts,
        }
    }

    #[tokio::test]
    async fn test_push_persists_and_truncates() {
        let store = Arc::new(MemoryStore::default());
        let mut history = History::load(HistoryStore::new(store.clone()), 2).await;

        history.push(message(Sender::User, "one", 1)).await;
        history.push(message(Sender::Bot, "two", 2)).await;
        history.push(message(Sender::User, "three", 3)).await;

        let saved = store.saved.lock().await.clone();

        assert_eq!(history.len(), 2);
        assert_eq!(saved.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(), vec!["two", "three"]);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = Arc::new(MemoryStore::default());
        let mut history = History::load(HistoryStore::new(store.clone()), 10).await;

        history.push(message(Sender::User, "one", 1)).await;
        history.push(message(Sender::Bot, "two", 2)).await;

        assert!(history.delete("id-1").await);
        assert!(!history.delete("id-1").await);
        assert_eq!(store.saved.lock().await.len(), 1);

        history.clear().await;

        assert!(history.is_empty());
        assert!(store.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_yields_empty_history() {
        let mut store = MockStore::new();
        store.expect_load().returning(|| Err(anyhow!("corrupt")));
        store.expect_save().returning(|_| Err(anyhow!("read-only")));

        let mut history = History::load(HistoryStore::new(Arc::new(store)), 10).await;
        assert!(history.is_empty());

        // Save failures are logged, not fatal.
        history.push(message(Sender::User, "still here", 1)).await;
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_format_transcript() {
        let messages = vec![message(Sender::User, "my pc is slow", 0), message(Sender::Bot, "Try a restart.", 60_000)];

        let transcript = format_transcript(&messages);
        let expected = format!("[{}] USER: my pc is slow\n[{}] BOT: Try a restart.", format_time(0), format_time(60_000));

        assert_eq!(transcript, expected);
    }

    #[tokio::test]
    async fn test_export_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat-history.txt");

        let err = export_transcript(&[], &path).await.unwrap_err();
        assert_eq!(err.to_string(), EMPTY_HISTORY_MESSAGE);

        export_transcript(&[message(Sender::User, "hello", 0)], &path).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.ends_with("USER: hello"));
    }
}

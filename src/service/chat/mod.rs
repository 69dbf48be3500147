pub mod http;

use std::{ops::Deref, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic "chat" trait that remote clients must implement.
///
/// This trait defines the single call the client makes to a remote assistant. Any error
/// (network failure, timeout, malformed payload) tells the caller to fall back to the
/// offline responder.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Ask the remote assistant for a reply to `message`.
    async fn get_reply(&self, message: &str) -> Res<String>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }

    /// A client with no remote endpoint; every call fails so the offline responder answers.
    pub fn offline() -> Self {
        Self { inner: Arc::new(OfflineChatClient) }
    }
}

/// Chat client used when no remote endpoint is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineChatClient;

#[async_trait]
impl GenericChatClient for OfflineChatClient {
    async fn get_reply(&self, _message: &str) -> Res<String> {
        Err(anyhow!("No chat endpoint configured."))
    }
}

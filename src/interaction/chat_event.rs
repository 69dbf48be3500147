use tracing::{debug, instrument, warn};

use crate::{
    base::types::ChatMessage,
    service::{chat::ChatClient, history::History, responder::FallbackResponder},
};

/// Handles a single chat turn.
///
/// Records the user's message, obtains a reply (remote first, offline otherwise), and records
/// the bot's message. Blank input is ignored and yields `None`.
#[instrument(skip_all)]
pub async fn handle_chat(text: &str, chat: &ChatClient, responder: &FallbackResponder, history: &mut History) -> Option<ChatMessage> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    history.push(ChatMessage::user(text)).await;

    let reply = get_bot_reply(text, chat, responder).await;
    let message = ChatMessage::bot(reply);

    history.push(message.clone()).await;

    Some(message)
}

/// Get a reply from the remote chat service, falling back to the offline responder on any failure.
#[instrument(skip_all)]
pub async fn get_bot_reply(text: &str, chat: &ChatClient, responder: &FallbackResponder) -> String {
    match chat.get_reply(text).await {
        Ok(reply) => {
            debug!("Received remote reply.");
            reply
        }
        Err(err) => {
            warn!("Server call failed, using local fallback: {}", err);
            responder.respond(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::{
        base::{
            replies::CLARIFICATION_REPLY,
            types::{Res, Sender, Void},
        },
        service::{
            chat::GenericChatClient,
            history::{GenericHistoryStore, HistoryStore},
        },
    };

    mock! {
        pub Chat {}

        #[async_trait]
        impl GenericChatClient for Chat {
            async fn get_reply(&self, message: &str) -> Res<String>;
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

    async fn empty_history() -> History {
        let mut store = MockStore::new();
        store.expect_load().returning(|| Ok(Vec::new()));
        store.expect_save().returning(|_| Ok(()));

        History::load(HistoryStore::new(Arc::new(store)), 300).await
    }

    #[tokio::test]
    async fn test_uses_remote_reply() {
        let mut mock = MockChat::new();
        mock.expect_get_reply().withf(|m| m.to_string() == "my pc is slow").times(1).returning(|_| Ok("Remote says hi.".to_string()));

        let chat = ChatClient::new(Arc::new(mock));
        let mut history = empty_history().await;

        let reply = handle_chat("  my pc is slow ", &chat, &FallbackResponder::default(), &mut history).await.unwrap();

        assert_eq!(reply.text, "Remote says hi.");
        assert_eq!(reply.sender, Sender::Bot);
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].text, "my pc is slow");
        assert_eq!(history.messages()[0].sender, Sender::User);
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let mut mock = MockChat::new();
        mock.expect_get_reply().returning(|_| Err(anyhow!("connection refused")));

        let chat = ChatClient::new(Arc::new(mock));
        let responder = FallbackResponder::default();

        let reply = get_bot_reply("why won't it boot", &chat, &responder).await;

        assert_eq!(reply, CLARIFICATION_REPLY);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut mock = MockChat::new();
        mock.expect_get_reply().times(0);

        let chat = ChatClient::new(Arc::new(mock));
        let mut history = empty_history().await;

        assert!(handle_chat("   ", &chat, &FallbackResponder::default(), &mut history).await.is_none());
        assert!(history.is_empty());
    }
}

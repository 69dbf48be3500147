//! HTTP implementation of the remote chat client.
//!
//! Posts `{"message": ...}` to the configured endpoint and expects `{"response": ...}` back.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the http implementation.

impl ChatClient {
    /// Creates a chat client for the configured endpoint, or an offline one if none is set.
    pub fn http(config: &Config) -> Res<Self> {
        let Some(endpoint) = config.chat_endpoint.as_deref() else {
            return Ok(Self::offline());
        };

        let client = HttpChatClient::new(endpoint, Duration::from_millis(config.request_timeout_ms))?;

        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

// Specific implementations.

/// Chat client that talks JSON over HTTP.
#[derive(Clone)]
pub struct HttpChatClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    timeout: Duration,
}

impl HttpChatClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Res<Self> {
        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| anyhow!("Invalid chat endpoint `{}`: {}", endpoint, e))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout,
        })
    }

    async fn post(&self, message: &str) -> Res<String> {
        let response = self.client.post(self.endpoint.clone()).json(&ChatRequest { message }).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Attempt to read an error message from the body.
            let error = response.json::<ErrorBody>().await.ok().and_then(|body| body.error).filter(|e| !e.is_empty());

            return Err(anyhow!(error.unwrap_or_else(|| format!("Server returned {}", status.as_u16()))));
        }

        let data: Value = response.json().await?;

        match data.get("response").and_then(Value::as_str) {
            Some(reply) => Ok(reply.to_string()),
            None => Err(anyhow!("Server returned a malformed payload without a `response` field.")),
        }
    }
}

#[async_trait]
impl GenericChatClient for HttpChatClient {
    #[instrument(name = "HttpChatClient::get_reply", skip_all)]
    async fn get_reply(&self, message: &str) -> Res<String> {
        debug!("Sending message to `{}` ...", self.endpoint);

        match timeout(self.timeout, self.post(message)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("Request timed out after {} ms.", self.timeout.as_millis())),
        }
    }
}

//! Shared test helpers for agent tests.

use async_trait::async_trait;
use promptsh_core::error::ProviderError;
use promptsh_core::message::Message;
use promptsh_core::provider::{ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A mock provider that returns a sequence of scripted replies.
///
/// `stream()` splits each reply into whitespace-preserving word fragments.
/// Panics if more calls are made than replies provided.
pub struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: ProviderRequest) -> String {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedProvider: no more replies")
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        Ok(ProviderResponse {
            message: Message::assistant(self.next_reply(request)),
            model,
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let reply = self.next_reply(request);
        let (tx, rx) = mpsc::channel(64);
        for fragment in reply.split_inclusive(' ') {
            let _ = tx
                .send(Ok(StreamChunk {
                    content: Some(fragment.to_string()),
                    done: false,
                }))
                .await;
        }
        let _ = tx.send(Ok(StreamChunk { content: None, done: true })).await;
        Ok(rx)
    }
}

/// A provider that always fails.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

//! Ollama provider implementation.
//!
//! Talks to Ollama's native `/api/chat` endpoint.
//!
//! Supports:
//! - Chat completions (non-streaming and streaming NDJSON)
//! - Model listing and health checks via `/api/tags`

use async_trait::async_trait;
use futures::StreamExt;
use promptsh_core::error::ProviderError;
use promptsh_core::message::Message;
use promptsh_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// An Ollama LLM provider.
pub struct OllamaProvider {
    base_url: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new provider for the Ollama instance at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature: None,
            client: build_client(Duration::from_secs(120)),
        }
    }

    /// Local instance on the default port.
    pub fn local() -> Self {
        Self::new("http://127.0.0.1:11434")
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Temperature used when a request does not set one.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_body(&self, request: &ProviderRequest, stream: bool) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(ApiMessage::from).collect(),
            stream,
            options: request
                .temperature
                .or(self.temperature)
                .map(|temperature| ChatOptions { temperature }),
        }
    }

    async fn post_chat(&self, body: &ChatRequest) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(status_error(status, &body.model, error_body));
        }

        Ok(response)
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a non-2xx status to a provider error. Ollama answers 404 for an
/// unknown model.
fn status_error(status: u16, model: &str, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    if status == 404 {
        ProviderError::ModelNotFound(format!("{model}: {message}"))
    } else {
        ProviderError::ApiError {
            status_code: status,
            message,
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = self.chat_body(&request, false);
        debug!(model = %request.model, "Sending completion request");

        let response = self.post_chat(&body).await?;

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(ProviderResponse {
            message: Message::assistant(api_response.message.map(|m| m.content).unwrap_or_default()),
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let body = self.chat_body(&request, true);
        debug!(model = %request.model, "Sending streaming request");

        let response = self.post_chat(&body).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Spawn task to read the NDJSON byte stream and forward fragments
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.extend_from_slice(&bytes);

                for line in drain_lines(&mut buffer) {
                    match parse_line(&line) {
                        LineEvent::Skip => continue,
                        LineEvent::Failed(message) => {
                            let _ = tx.send(Err(ProviderError::StreamInterrupted(message))).await;
                            return;
                        }
                        LineEvent::Chunk(chunk) => {
                            let done = chunk.done;
                            if tx.send(Ok(chunk)).await.is_err() {
                                return; // receiver dropped
                            }
                            if done {
                                return;
                            }
                        }
                    }
                }
            }

            // Trailing line without a newline
            if let Ok(line) = std::str::from_utf8(&buffer) {
                if let LineEvent::Chunk(chunk) = parse_line(line) {
                    if tx.send(Ok(chunk)).await.is_err() {
                        return;
                    }
                }
            }

            // Stream ended without `done: true`: close it explicitly
            let _ = tx
                .send(Ok(StreamChunk {
                    content: None,
                    done: true,
                }))
                .await;
        });

        Ok(rx)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// Remove every complete line from `buffer`, leaving any partial tail.
///
/// Lines are decoded only once complete, so a character split across
/// network chunks is reassembled. Lines that are not valid UTF-8 are skipped.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=line_end).collect();
        match String::from_utf8(raw) {
            Ok(line) => lines.push(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => trace!(error = %e, "Skipping non-UTF-8 stream line"),
        }
    }
    lines
}

/// What one NDJSON line means for the stream.
#[derive(Debug)]
enum LineEvent {
    Chunk(StreamChunk),
    Failed(String),
    Skip,
}

fn parse_line(line: &str) -> LineEvent {
    let line = line.trim();
    if line.is_empty() {
        return LineEvent::Skip;
    }

    match serde_json::from_str::<ChatResponse>(line) {
        Ok(resp) => {
            if let Some(error) = resp.error {
                return LineEvent::Failed(error);
            }
            let content = resp.message.map(|m| m.content).filter(|c| !c.is_empty());
            if content.is_none() && !resp.done {
                return LineEvent::Skip;
            }
            LineEvent::Chunk(StreamChunk {
                content,
                done: resp.done,
            })
        }
        Err(e) => {
            trace!(data = %line, error = %e, "Ignoring unparseable stream line");
            LineEvent::Skip
        }
    }
}

// --- Ollama API types (internal) ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

impl From<&Message> for ApiMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role.as_str().into(),
            content: m.content.clone(),
        }
    }
}

/// One response object; the same shape is used for every streamed line.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ApiMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

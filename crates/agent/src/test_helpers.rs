//! Shared test helpers for triage flow tests.

use std::sync::Mutex;
use triagent_core::error::ProviderError;
use triagent_core::message::Turn;
use triagent_core::provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};

/// A mock provider driven by scripted outcomes.
///
/// `complete` returns the next queued outcome; `stream` plays the next
/// scripted chunk sequence if one was queued, otherwise wraps the next
/// completion outcome as a single chunk. Panics when a queue runs dry.
/// Every request is captured for assertions.
pub(crate) struct ScriptedProvider {
    completions: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    streams: Mutex<Vec<Vec<Result<StreamChunk, ProviderError>>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(completions: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            completions: Mutex::new(completions),
            streams: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers one completion call with the given text.
    pub fn text(text: &str) -> Self {
        Self::new(vec![Ok(make_response(text))])
    }

    /// A provider that answers successive completion calls with these texts.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_response(t))).collect())
    }

    /// A provider whose first completion call fails with the given error.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Queue a scripted chunk sequence for the next `stream` call.
    pub fn with_stream(self, chunks: Vec<Result<StreamChunk, ProviderError>>) -> Self {
        self.streams.lock().unwrap().push(chunks);
        self
    }

    /// All captured requests, in call order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_completion(&self) -> Result<ProviderResponse, ProviderError> {
        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            panic!("ScriptedProvider exhausted: no completions left");
        }
        completions.remove(0)
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.next_completion()
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError>
    {
        self.requests.lock().unwrap().push(request);

        let scripted = {
            let mut streams = self.streams.lock().unwrap();
            if streams.is_empty() {
                None
            } else {
                Some(streams.remove(0))
            }
        };

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        match scripted {
            Some(chunks) => {
                tokio::spawn(async move {
                    for chunk in chunks {
                        if tx.send(chunk).await.is_err() {
                            return;
                        }
                    }
                });
            }
            None => {
                let response = self.next_completion()?;
                let _ = tx
                    .send(Ok(StreamChunk {
                        content: Some(response.message.content),
                        done: true,
                        usage: response.usage,
                    }))
                    .await;
            }
        }
        Ok(rx)
    }
}

/// Create a simple assistant response.
pub(crate) fn make_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Turn::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Content chunks for the given parts followed by a final done chunk.
pub(crate) fn text_chunks(parts: &[&str]) -> Vec<Result<StreamChunk, ProviderError>> {
    let mut chunks: Vec<Result<StreamChunk, ProviderError>> = parts
        .iter()
        .map(|p| {
            Ok(StreamChunk {
                content: Some(p.to_string()),
                done: false,
                usage: None,
            })
        })
        .collect();
    chunks.push(Ok(StreamChunk {
        content: None,
        done: true,
        usage: None,
    }));
    chunks
}

/// Content chunks for the given parts, then a mid-stream failure.
pub(crate) fn interrupted_chunks(parts: &[&str]) -> Vec<Result<StreamChunk, ProviderError>> {
    let mut chunks = text_chunks(parts);
    chunks.pop();
    chunks.push(Err(ProviderError::StreamInterrupted(
        "connection reset".into(),
    )));
    chunks
}

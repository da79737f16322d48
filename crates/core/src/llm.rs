//! # Text Generation Client
//!
//! Thin client for an Ollama-compatible generation backend. The core only
//! consumes this interface; the backend itself is an external collaborator
//! that may block for seconds or fail outright.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;

/// Default local Ollama endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model served by the backend
pub const DEFAULT_MODEL: &str = "llama2";

/// Default per-request timeout; generation can legitimately take a while
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// The text-generation seam: prompt in, generated text out.
///
/// Dispatch is written against this trait so tests can substitute a stub
/// without a live backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for Ollama's `/api/generate` endpoint
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout)
                } else {
                    GenerationError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

// Copyright 2025 Ragscope (https://github.com/ragscope)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Collaborator abstractions for the embedding model and the LLM judge
//!
//! Both external services are capabilities behind a trait with a single
//! method, so evaluation code never depends on a concrete vendor client
//! and tests can substitute deterministic fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Trait for chat-completion clients used by the Tier 2 judge.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send a system instruction and user prompt, get a single textual
    /// completion. Implementations pin temperature to 0 and constrain the
    /// response format to a single JSON object.
    async fn complete(&self, system: &str, prompt: &str) -> Result<LLMResponse, LLMError>;
}

/// Trait for embedding clients used by the Tier 1 scorer.
///
/// Implementations must be deterministic for identical input under a fixed
/// model identifier.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbedError>;
}

/// Response from an LLM completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
}

/// Token usage reported by the completion service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Errors from LLM clients
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from embedding clients
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OpenAI-compatible client implementing both capabilities.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Default request timeout; network calls must never block indefinitely.
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: String, model: String) -> Self {
        Self::with_timeout_inner(api_key, model, Self::DEFAULT_TIMEOUT)
    }

    fn with_timeout_inner(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            api_key,
            model,
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to construct HTTP client"),
        }
    }

    /// Point the client at a different endpoint (test servers, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_embedding_model(mut self, model: String) -> Self {
        self.embedding_model = model;
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let mut rebuilt = Self::with_timeout_inner(self.api_key, self.model, timeout);
        rebuilt.embedding_model = self.embedding_model;
        rebuilt.base_url = self.base_url;
        rebuilt
    }
}

#[async_trait]
impl LLMClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<LLMResponse, LLMError> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.0,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(LLMError::ApiError(error_text));
        }

        let response_data: serde_json::Value = response.json().await?;

        let content = response_data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LLMError::InvalidResponse("Missing content".to_string()))?
            .to_string();

        let usage_data = &response_data["usage"];
        let usage = TokenUsage {
            prompt_tokens: usage_data["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: usage_data["completion_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: usage_data["total_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(LLMResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbedError> {
        let request = serde_json::json!({
            "model": self.embedding_model,
            "input": [text]
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(EmbedError::ApiError(error_text));
        }

        let response_data: serde_json::Value = response.json().await?;

        let vector: Vec<f64> = response_data["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| EmbedError::ApiError("No embedding returned".to_string()))?
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();

        if vector.is_empty() {
            return Err(EmbedError::ApiError("Empty embedding returned".to_string()));
        }

        Ok(vector)
    }
}

/// Deterministic offline embedding client.
///
/// Buckets lowercased alphanumeric words into a fixed-size vector by
/// seahash, so texts sharing vocabulary get high cosine similarity without
/// any model download or network access. Suitable for offline runs and
/// tests; not a substitute for a real sentence-embedding model.
pub struct LocalEmbeddingClient {
    dims: usize,
}

impl LocalEmbeddingClient {
    pub fn new() -> Self {
        Self { dims: 256 }
    }
}

impl Default for LocalEmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingClient for LocalEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbedError> {
        let mut vector = vec![0.0; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = seahash::hash(word.to_lowercase().as_bytes()) as usize % self.dims;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

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

//! Tier 1: embedding-similarity scoring
//!
//! Relevance is the cosine similarity between the query and response
//! embeddings. Grounding is the maximum similarity between the response
//! and any single context chunk: it answers "is the response supported by
//! any one chunk", not whether the whole context jointly supports it.

use crate::llm_client::{EmbedError, EmbeddingClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Tier 1 output. Cosine similarities in [-1,1], reported unclamped to
/// [0,1] by design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScores {
    pub relevance: f64,
    pub grounding: f64,
}

/// Embedding-based relevance and grounding scorer.
pub struct EmbeddingScorer {
    embedder: Arc<dyn EmbeddingClient>,
}

impl EmbeddingScorer {
    pub fn new(embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { embedder }
    }

    /// Score one query/response pair against its context chunks.
    ///
    /// Each text is embedded exactly once per call: query once, response
    /// once, each chunk once. Nothing is cached across calls. An embedding
    /// failure is a hard error; relevance and grounding are too central to
    /// degrade silently.
    pub async fn score(
        &self,
        query: &str,
        response: &str,
        chunks: &[String],
    ) -> Result<SimilarityScores, EmbedError> {
        let query_vec = self.embedder.embed(query).await?;
        let response_vec = self.embedder.embed(response).await?;

        let relevance = Self::cosine_similarity(&query_vec, &response_vec);

        let mut grounding = 0.0;
        let mut best_chunk = None;
        for (index, chunk) in chunks.iter().enumerate() {
            let chunk_vec = self.embedder.embed(chunk).await?;
            let similarity = Self::cosine_similarity(&response_vec, &chunk_vec);
            if best_chunk.is_none() || similarity > grounding {
                grounding = similarity;
                best_chunk = Some(index);
            }
        }

        debug!(relevance, grounding, ?best_chunk, "tier 1 scores");
        Ok(SimilarityScores {
            relevance,
            grounding,
        })
    }

    /// `dot(a,b) / (|a| * |b|)`. An all-zero embedding has no direction;
    /// either norm below 1e-9 yields 0.0 instead of dividing by zero. The
    /// clamp only absorbs float rounding past the [-1,1] range.
    fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

        let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

        if norm_a < 1e-9 || norm_b < 1e-9 {
            return 0.0;
        }

        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

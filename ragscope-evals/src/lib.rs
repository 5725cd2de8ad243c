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

//! # Ragscope Evaluation Engine
//!
//! Two-tier quality evaluation for a single retrieval-augmented chat
//! exchange:
//!
//! - **Tier 1** ([`EmbeddingScorer`]): embedding cosine similarity for
//!   query/response relevance and response/context grounding
//! - **Tier 2** ([`FactualJudge`]): LLM-as-judge factual-consistency check
//!   with a strict JSON output contract and a neutral fallback verdict
//! - **Metrics** ([`MetricsCalculator`]): wall-clock latency between the
//!   turn pair and token-based cost estimation
//!
//! [`EvaluationPipeline`] orchestrates the three over the most recent
//! user/AI turn pair of a conversation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ragscope_evals::{EvaluationPipeline, llm_client::OpenAiClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(OpenAiClient::new(
//!         std::env::var("OPENAI_API_KEY").unwrap(),
//!         "gpt-4o-mini".to_string(),
//!     ));
//!     let pipeline = EvaluationPipeline::new(client.clone(), client);
//!     let report = pipeline.run(&chat, &vectors).await.unwrap();
//! }
//! ```
//!
//! Collaborators are injected as trait objects so test suites can
//! substitute deterministic fakes; the pipeline never constructs them
//! internally.

pub mod config;
pub mod fallback;
pub mod judge;
pub mod llm_client;
pub mod metrics;
pub mod pipeline;
pub mod scorer;

pub use config::{EvalConfig, ModelPricing};
pub use judge::FactualJudge;
pub use metrics::MetricsCalculator;
pub use pipeline::{EvaluationPipeline, PipelineError};
pub use scorer::{EmbeddingScorer, SimilarityScores};

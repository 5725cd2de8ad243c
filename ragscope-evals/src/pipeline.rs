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

//! Evaluation pipeline
//!
//! Orchestrates one strictly sequential evaluation of the most recent
//! user/AI turn pair: Tier 1 embedding scores, Tier 2 judge verdict,
//! latency and cost metrics, merged into one report. The only failures a
//! caller sees are structural input errors and embedding-service errors;
//! every other failure mode degrades inside its component.

use crate::config::EvalConfig;
use crate::judge::FactualJudge;
use crate::llm_client::{EmbedError, EmbeddingClient, LLMClient};
use crate::metrics::MetricsCalculator;
use crate::scorer::EmbeddingScorer;
use ragscope_core::{
    ContextDocument, ConversationDocument, ConversationTurn, EvaluationReport, ReportInputs,
    ReportMetrics, Role,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Failures surfaced by [`EvaluationPipeline::run`]. No partial report is
/// produced for any of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No conversation_turns found")]
    EmptyConversation,

    #[error("Missing user/AI turns")]
    MissingTurnPair,

    #[error("Embedding service failed: {0}")]
    Embedding(#[from] EmbedError),
}

/// Two-tier evaluation pipeline over injected collaborator capabilities.
///
/// Holds no mutable state; one instance can serve many sequential `run`
/// calls, and independent instances parallelize trivially.
pub struct EvaluationPipeline {
    scorer: EmbeddingScorer,
    judge: FactualJudge,
    metrics: MetricsCalculator,
    config: EvalConfig,
}

impl EvaluationPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, llm: Arc<dyn LLMClient>) -> Self {
        Self::with_config(embedder, llm, EvalConfig::default())
    }

    pub fn with_config(
        embedder: Arc<dyn EmbeddingClient>,
        llm: Arc<dyn LLMClient>,
        config: EvalConfig,
    ) -> Self {
        Self {
            scorer: EmbeddingScorer::new(embedder),
            judge: FactualJudge::new(llm).with_max_context_chars(config.max_context_chars),
            metrics: MetricsCalculator::with_pricing(config.pricing),
            config,
        }
    }

    /// Evaluate the most recent user/AI pair of `chat` against the
    /// retrieved context in `vectors`.
    pub async fn run(
        &self,
        chat: &ConversationDocument,
        vectors: &ContextDocument,
    ) -> Result<EvaluationReport, PipelineError> {
        let turns = &chat.conversation_turns;
        if turns.is_empty() {
            return Err(PipelineError::EmptyConversation);
        }

        // Reverse scan; turns between the located pair are ignored, only
        // the single most recent pair is evaluated.
        let last_user = Self::last_with_role(turns, Role::User);
        let last_ai = Self::last_with_role(turns, Role::Ai);
        let (user, ai) = match (last_user, last_ai) {
            (Some(user), Some(ai)) => (user, ai),
            _ => return Err(PipelineError::MissingTurnPair),
        };

        // Tier 1 sees the full chunk list; the judge bounds its own prefix
        // of the joined text.
        let chunks = vectors.chunks();
        let context_text = chunks.join("\n");

        let scores = self.scorer.score(&user.message, &ai.message, &chunks).await?;
        let verdict = self.judge.judge(&context_text, &ai.message).await;

        let latency_ms = self
            .metrics
            .calculate_latency(&user.created_at, &ai.created_at);
        let prompt_proxy = format!("{}{}", user.message, context_text);
        let cost_usd = self.metrics.calculate_cost(&prompt_proxy, &ai.message);

        info!(
            latency_ms,
            cost_usd,
            relevance = scores.relevance,
            grounding = scores.grounding,
            hallucination = verdict.is_hallucination,
            "evaluation complete"
        );

        Ok(EvaluationReport {
            inputs: ReportInputs {
                user_query: user.message.clone(),
                ai_response: Self::preview(&ai.message, self.config.response_preview_chars),
            },
            metrics: ReportMetrics {
                latency_ms,
                cost_usd,
                relevance: Self::round3(scores.relevance),
                grounding: Self::round3(scores.grounding),
                factual_accuracy: verdict.score,
                hallucination_detected: verdict.is_hallucination,
                hallucination_reason: verdict.reason,
            },
        })
    }

    fn last_with_role(turns: &[ConversationTurn], role: Role) -> Option<&ConversationTurn> {
        turns.iter().rev().find(|t| t.role == role)
    }

    fn preview(message: &str, chars: usize) -> String {
        let mut preview: String = message.chars().take(chars).collect();
        preview.push_str("...");
        preview
    }

    fn round3(value: f64) -> f64 {
        (value * 1000.0).round() / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LLMError, LLMResponse, LocalEmbeddingClient, TokenUsage};
    use async_trait::async_trait;
    use ragscope_core::{ContextData, VectorEntry};

    struct StaticJudgeClient {
        content: String,
    }

    impl StaticJudgeClient {
        fn consistent() -> Arc<Self> {
            Arc::new(Self {
                content: r#"{"is_hallucination": false, "reason": "Consistent with context", "score": 0.97}"#
                    .to_string(),
            })
        }

        fn contradicting() -> Arc<Self> {
            Arc::new(Self {
                content: r#"{"is_hallucination": true, "reason": "Context says 2 million, response says 20 million", "score": 0.88}"#
                    .to_string(),
            })
        }
    }

    #[async_trait]
    impl LLMClient for StaticJudgeClient {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<LLMResponse, LLMError> {
            Ok(LLMResponse {
                content: self.content.clone(),
                usage: TokenUsage::default(),
                model: "mock-model".to_string(),
            })
        }
    }

    fn turn(role: Role, message: &str, created_at: &str) -> ConversationTurn {
        ConversationTurn {
            role,
            message: message.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn chat(turns: Vec<ConversationTurn>) -> ConversationDocument {
        ConversationDocument {
            conversation_turns: turns,
        }
    }

    fn context(texts: &[&str]) -> ContextDocument {
        ContextDocument {
            data: ContextData {
                vector_data: texts
                    .iter()
                    .map(|t| VectorEntry {
                        text: t.to_string(),
                    })
                    .collect(),
            },
        }
    }

    fn offline_pipeline(judge: Arc<StaticJudgeClient>) -> EvaluationPipeline {
        EvaluationPipeline::new(Arc::new(LocalEmbeddingClient::new()), judge)
    }

    #[tokio::test]
    async fn test_end_to_end_grounded_answer() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let report = pipeline
            .run(
                &chat(vec![
                    turn(
                        Role::User,
                        "What is the capital of France?",
                        "2024-01-01T10:00:00.000000Z",
                    ),
                    turn(
                        Role::Ai,
                        "The capital of France is Paris.",
                        "2024-01-01T10:00:02.000000Z",
                    ),
                ]),
                &context(&["Paris is the capital and most populous city of France."]),
            )
            .await
            .unwrap();

        assert_eq!(report.inputs.user_query, "What is the capital of France?");
        assert!((report.metrics.latency_ms - 2000.0).abs() < 1.0);
        assert!(report.metrics.cost_usd > 0.0);
        assert!(report.metrics.relevance > 0.5);
        assert!(report.metrics.grounding > 0.5);
        assert!(!report.metrics.hallucination_detected);
        assert_eq!(report.metrics.factual_accuracy, 0.97);
    }

    #[tokio::test]
    async fn test_end_to_end_contradicted_answer() {
        let pipeline = offline_pipeline(StaticJudgeClient::contradicting());

        let report = pipeline
            .run(
                &chat(vec![
                    turn(
                        Role::User,
                        "How many people live in the city?",
                        "2024-01-01T10:00:00.000000Z",
                    ),
                    turn(
                        Role::Ai,
                        "The city has a population of 20 million.",
                        "2024-01-01T10:00:01.500000Z",
                    ),
                ]),
                &context(&["The city has a population of 2 million."]),
            )
            .await
            .unwrap();

        assert!(report.metrics.hallucination_detected);
        assert_eq!(report.metrics.factual_accuracy, 0.88);
        assert!(report.metrics.hallucination_reason.contains("2 million"));
    }

    #[tokio::test]
    async fn test_empty_conversation_is_structural_error() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let err = pipeline
            .run(&chat(vec![]), &context(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyConversation));
    }

    #[tokio::test]
    async fn test_missing_ai_turn_is_structural_error() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let err = pipeline
            .run(
                &chat(vec![turn(
                    Role::User,
                    "Anyone there?",
                    "2024-01-01T10:00:00.000000Z",
                )]),
                &context(&["unused"]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingTurnPair));
    }

    #[tokio::test]
    async fn test_only_most_recent_pair_is_evaluated() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let report = pipeline
            .run(
                &chat(vec![
                    turn(Role::User, "first question", "2024-01-01T10:00:00.000000Z"),
                    turn(Role::Ai, "first answer", "2024-01-01T10:00:01.000000Z"),
                    turn(Role::User, "second question", "2024-01-01T10:01:00.000000Z"),
                    turn(Role::Ai, "second answer", "2024-01-01T10:01:03.000000Z"),
                ]),
                &context(&[]),
            )
            .await
            .unwrap();

        assert_eq!(report.inputs.user_query, "second question");
        assert!(report.inputs.ai_response.starts_with("second answer"));
        assert!((report.metrics.latency_ms - 3000.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_empty_chunk_list_grounds_to_zero() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let report = pipeline
            .run(
                &chat(vec![
                    turn(Role::User, "question", "2024-01-01T10:00:00.000000Z"),
                    turn(Role::Ai, "answer", "2024-01-01T10:00:01.000000Z"),
                ]),
                &context(&["", ""]),
            )
            .await
            .unwrap();

        assert_eq!(report.metrics.grounding, 0.0);
    }

    #[tokio::test]
    async fn test_relevance_is_deterministic_across_runs() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());
        let conversation = chat(vec![
            turn(
                Role::User,
                "What is the capital of France?",
                "2024-01-01T10:00:00.000000Z",
            ),
            turn(
                Role::Ai,
                "The capital of France is Paris.",
                "2024-01-01T10:00:02.000000Z",
            ),
        ]);
        let vectors = context(&["Paris is the capital of France."]);

        let first = pipeline.run(&conversation, &vectors).await.unwrap();
        let second = pipeline.run(&conversation, &vectors).await.unwrap();
        assert_eq!(first.metrics.relevance, second.metrics.relevance);
        assert_eq!(first.metrics.grounding, second.metrics.grounding);
    }

    #[tokio::test]
    async fn test_response_preview_is_truncated_with_ellipsis() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());
        let long_answer = "word ".repeat(100);

        let report = pipeline
            .run(
                &chat(vec![
                    turn(Role::User, "question", "2024-01-01T10:00:00.000000Z"),
                    turn(Role::Ai, &long_answer, "2024-01-01T10:00:01.000000Z"),
                ]),
                &context(&[]),
            )
            .await
            .unwrap();

        assert_eq!(report.inputs.ai_response.chars().count(), 153);
        assert!(report.inputs.ai_response.ends_with("..."));
    }

    #[tokio::test]
    async fn test_similarity_scores_are_rounded_to_three_decimals() {
        let pipeline = offline_pipeline(StaticJudgeClient::consistent());

        let report = pipeline
            .run(
                &chat(vec![
                    turn(
                        Role::User,
                        "What is the capital of France?",
                        "2024-01-01T10:00:00.000000Z",
                    ),
                    turn(
                        Role::Ai,
                        "The capital of France is Paris.",
                        "2024-01-01T10:00:02.000000Z",
                    ),
                ]),
                &context(&["Paris is the capital and most populous city of France."]),
            )
            .await
            .unwrap();

        for value in [report.metrics.relevance, report.metrics.grounding] {
            let scaled = value * 1000.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }
}

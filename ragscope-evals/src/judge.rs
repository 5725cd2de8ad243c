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

//! Tier 2: LLM-as-judge factual-consistency check
//!
//! The judge receives the concatenated context and the AI response
//! verbatim and must answer with a single JSON object. Output that does
//! not deserialize into [`JudgeVerdict`] is rejected, never trusted, and
//! replaced by the neutral fallback verdict.

use crate::fallback;
use crate::llm_client::{LLMClient, LLMError};
use ragscope_core::JudgeVerdict;
use std::sync::Arc;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a strict factual evaluation judge. JSON output only.";

const JUDGE_PROMPT: &str = r#"CONTEXT:
{context}

AI RESPONSE:
{response}

TASK:
Identify factual inconsistencies between RESPONSE and CONTEXT.
Focus specifically on numeric values and entity names.
Output JSON ONLY:
{
    "is_hallucination": <true/false>,
    "reason": "<string>",
    "score": <0.0 - 1.0>
}"#;

/// Factual-consistency judge over an external chat-completion capability.
pub struct FactualJudge {
    client: Arc<dyn LLMClient>,
    max_context_chars: usize,
}

impl FactualJudge {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            max_context_chars: 4000,
        }
    }

    /// Bound on the context prefix included in the prompt (default 4000
    /// characters, applied to the concatenated context, not per chunk).
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    /// Judge one response against its context. Never fails: any error in
    /// the call or in the returned JSON becomes the fallback verdict
    /// `{is_hallucination: false, reason: "LLM failure: ...", score: 0.5}`.
    /// The 0.5 encodes unknown/neutral, not a measured confidence.
    pub async fn judge(&self, context_text: &str, response_text: &str) -> JudgeVerdict {
        fallback::degrade_with(
            "judge call",
            self.try_judge(context_text, response_text).await,
            |cause| JudgeVerdict {
                is_hallucination: false,
                reason: format!("LLM failure: {cause}"),
                score: 0.5,
            },
        )
    }

    async fn try_judge(
        &self,
        context_text: &str,
        response_text: &str,
    ) -> Result<JudgeVerdict, LLMError> {
        let context: String = context_text.chars().take(self.max_context_chars).collect();
        let prompt = JUDGE_PROMPT
            .replace("{context}", &context)
            .replace("{response}", response_text);

        let response = self.client.complete(SYSTEM_PROMPT, &prompt).await?;
        debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            model = %response.model,
            "judge completion"
        );

        let verdict: JudgeVerdict = serde_json::from_str(&response.content)?;
        Ok(verdict)
    }
}

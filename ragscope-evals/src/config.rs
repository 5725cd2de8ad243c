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

//! Evaluation configuration
//!
//! Pricing, truncation bounds and model identifiers are configuration, not
//! logic; everything here has a production-grade default so the pipeline
//! can be built with `EvalConfig::default()`.

use serde::{Deserialize, Serialize};

/// Per-token pricing for cost estimation, in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// USD per input/prompt token
    pub input_price_per_token: f64,
    /// USD per output/completion token
    pub output_price_per_token: f64,
}

impl ModelPricing {
    /// GPT-4o-mini: $0.15 / $0.60 per 1M tokens
    pub const GPT_4O_MINI: Self = Self {
        input_price_per_token: 0.15 / 1_000_000.0,
        output_price_per_token: 0.60 / 1_000_000.0,
    };

    /// GPT-4o: $2.50 / $10.00 per 1M tokens
    pub const GPT_4O: Self = Self {
        input_price_per_token: 2.50 / 1_000_000.0,
        output_price_per_token: 10.00 / 1_000_000.0,
    };

    /// Pricing for a known model name, defaulting to GPT-4o-mini.
    pub fn for_model(model: &str) -> Self {
        match model {
            "gpt-4o" => Self::GPT_4O,
            _ => Self::GPT_4O_MINI,
        }
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::GPT_4O_MINI
    }
}

/// Configuration for one evaluation pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Chat-completion model used as the Tier 2 judge
    pub judge_model: String,

    /// Embedding model used by Tier 1
    pub embedding_model: String,

    /// Request timeout for embedding and judge calls, in seconds
    pub timeout_secs: u64,

    /// Per-token pricing applied by the cost metric
    pub pricing: ModelPricing,

    /// Concatenated context is truncated to this many characters before
    /// being handed to the judge, bounding prompt size
    pub max_context_chars: usize,

    /// AI response preview length in the report's `inputs` echo
    pub response_preview_chars: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            judge_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_secs: 30,
            pricing: ModelPricing::default(),
            max_context_chars: 4000,
            response_preview_chars: 150,
        }
    }
}

impl EvalConfig {
    pub fn with_judge_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.pricing = ModelPricing::for_model(&model);
        self.judge_model = model;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    pub fn with_response_preview_chars(mut self, chars: usize) -> Self {
        self.response_preview_chars = chars;
        self
    }
}

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

//! Latency and cost metrics
//!
//! Both metrics follow the degrade-not-fail policy: a malformed timestamp
//! or an unavailable tokenizer yields the 0.0 sentinel, never an error. A
//! report must stay actionable even when a metric input is broken.

use crate::config::ModelPricing;
use crate::fallback;
use chrono::NaiveDateTime;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Naive datetime with a mandatory fractional-second part.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Computes wall-clock latency between a turn pair and estimates the
/// monetary cost of the evaluated text.
///
/// Holds a `cl100k_base` tokenizer handle, loaded once at construction;
/// the handle is stateless and safe to reuse across sequential runs.
pub struct MetricsCalculator {
    tokenizer: Option<CoreBPE>,
    pricing: ModelPricing,
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self::with_pricing(ModelPricing::default())
    }

    pub fn with_pricing(pricing: ModelPricing) -> Self {
        let tokenizer = fallback::degrade("cl100k_base tokenizer load", cl100k_base().map(Some), None);
        Self { tokenizer, pricing }
    }

    /// Milliseconds elapsed between the user turn and the AI turn.
    ///
    /// Returns 0.0 on any parse failure; negative if the timestamps are
    /// out of order. A true zero latency is indistinguishable from the
    /// fallback by contract.
    pub fn calculate_latency(&self, user_timestamp: &str, ai_timestamp: &str) -> f64 {
        fallback::degrade(
            "latency computation",
            Self::latency_ms(user_timestamp, ai_timestamp),
            0.0,
        )
    }

    fn latency_ms(user_timestamp: &str, ai_timestamp: &str) -> Result<f64, String> {
        let user = Self::parse_naive(user_timestamp)?;
        let ai = Self::parse_naive(ai_timestamp)?;
        let delta = ai - user;
        Ok(delta
            .num_microseconds()
            .map(|us| us as f64 / 1000.0)
            .unwrap_or_else(|| delta.num_milliseconds() as f64))
    }

    /// Everything from the first `Z` onward is stripped (UTC zone marker on
    /// microsecond timestamps); offsets like `+02:00` are not understood
    /// and fail the parse. The fractional part is mandatory: `%.f` alone
    /// would accept bare seconds, which the upstream format never emits.
    fn parse_naive(timestamp: &str) -> Result<NaiveDateTime, String> {
        let trimmed = timestamp.split('Z').next().unwrap_or_default();
        if !trimmed.contains('.') {
            return Err(format!(
                "timestamp {timestamp:?} lacks a fractional-second part"
            ));
        }
        NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
            .map_err(|e| format!("timestamp {timestamp:?}: {e}"))
    }

    /// Estimated cost in USD for one prompt/response pair, per-token
    /// pricing, rounded to 8 decimal places. 0.0 when no tokenizer could
    /// be loaded.
    pub fn calculate_cost(&self, prompt_text: &str, response_text: &str) -> f64 {
        fallback::degrade(
            "cost estimation",
            self.cost_usd(prompt_text, response_text),
            0.0,
        )
    }

    fn cost_usd(&self, prompt_text: &str, response_text: &str) -> Result<f64, String> {
        let tokenizer = self
            .tokenizer
            .as_ref()
            .ok_or_else(|| "tokenizer unavailable".to_string())?;

        let input_tokens = tokenizer.encode_ordinary(prompt_text).len() as f64;
        let output_tokens = tokenizer.encode_ordinary(response_text).len() as f64;

        let cost = input_tokens * self.pricing.input_price_per_token
            + output_tokens * self.pricing.output_price_per_token;
        Ok((cost * 1e8).round() / 1e8)
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_two_seconds() {
        let metrics = MetricsCalculator::new();
        let latency = metrics.calculate_latency(
            "2024-01-01T10:00:00.000000Z",
            "2024-01-01T10:00:02.000000Z",
        );
        assert!((latency - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_latency_microsecond_precision() {
        let metrics = MetricsCalculator::new();
        let latency = metrics.calculate_latency(
            "2024-01-01T10:00:00.000000Z",
            "2024-01-01T10:00:00.001500Z",
        );
        assert!((latency - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_latency_negative_when_swapped() {
        let metrics = MetricsCalculator::new();
        let latency = metrics.calculate_latency(
            "2024-01-01T10:00:02.000000Z",
            "2024-01-01T10:00:00.000000Z",
        );
        assert!((latency + 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_latency_zero_for_malformed_pairs() {
        let metrics = MetricsCalculator::new();

        // non-ISO strings
        assert_eq!(metrics.calculate_latency("yesterday", "today"), 0.0);
        // one side malformed
        assert_eq!(
            metrics.calculate_latency("2024-01-01T10:00:00.000000Z", "???"),
            0.0
        );
        // missing fractional part
        assert_eq!(
            metrics.calculate_latency("2024-01-01T10:00:00Z", "2024-01-01T10:00:02Z"),
            0.0
        );
        // numeric offset instead of Z marker
        assert_eq!(
            metrics.calculate_latency(
                "2024-01-01T10:00:00.000000+00:00",
                "2024-01-01T10:00:02.000000+00:00"
            ),
            0.0
        );
        // empty
        assert_eq!(metrics.calculate_latency("", ""), 0.0);
    }

    #[test]
    fn test_latency_accepts_missing_zone_marker() {
        // naive timestamps without the trailing Z parse the same way
        let metrics = MetricsCalculator::new();
        let latency = metrics
            .calculate_latency("2024-01-01T10:00:00.000000", "2024-01-01T10:00:01.000000");
        assert!((latency - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_is_nonnegative_and_monotone() {
        let metrics = MetricsCalculator::new();

        let base = metrics.calculate_cost("What is the capital of France?", "Paris");
        assert!(base > 0.0);

        let longer = metrics.calculate_cost(
            "What is the capital of France?",
            "Paris Paris Paris Paris Paris Paris Paris Paris",
        );
        assert!(longer > base);

        assert_eq!(metrics.calculate_cost("", ""), 0.0);
    }

    #[test]
    fn test_cost_applies_per_token_pricing() {
        let pricing = ModelPricing {
            input_price_per_token: 1.0,
            output_price_per_token: 2.0,
        };
        let metrics = MetricsCalculator::with_pricing(pricing);

        // "hello world" is two cl100k tokens; 2*1.0 input + 2*2.0 output
        let cost = metrics.calculate_cost("hello world", "hello world");
        assert!((cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_rounded_to_eight_decimals() {
        let metrics = MetricsCalculator::new();
        let cost = metrics.calculate_cost("a longer prompt with several tokens", "short reply");
        let scaled = cost * 1e8;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }
}

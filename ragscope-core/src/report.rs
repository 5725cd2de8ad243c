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

//! Judge verdict and evaluation report contracts

use serde::{Deserialize, Serialize};

/// Verdict returned by the Tier 2 factual judge.
///
/// All three fields are required when parsing judge output; a response
/// missing any of them is treated as a failed call and replaced by the
/// neutral fallback verdict upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub is_hallucination: bool,
    pub reason: String,
    /// Factual-accuracy score in [0,1]. Exactly 0.5 is also the fallback
    /// sentinel meaning "unknown/neutral", not a measured confidence.
    pub score: f64,
}

/// Echo of the evaluated inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInputs {
    pub user_query: String,
    /// Truncated preview of the AI response, ellipsis-terminated.
    pub ai_response: String,
}

/// All metrics for one evaluated turn pair.
///
/// `relevance` and `grounding` are cosine similarities: the natural range
/// is [-1,1] and they are reported unclamped. `latency_ms` of 0.0 may be
/// the silent-fallback sentinel for an unparseable timestamp pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub latency_ms: f64,
    pub cost_usd: f64,
    pub relevance: f64,
    pub grounding: f64,
    pub factual_accuracy: f64,
    pub hallucination_detected: bool,
    pub hallucination_reason: String,
}

/// Final evaluation report, created once per pipeline run and immutable
/// after construction. Serialized field order is the stable output order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub inputs: ReportInputs,
    pub metrics: ReportMetrics,
}

/// Serialize any report-shaped value with 4-space indentation.
///
/// `serde_json::to_string_pretty` indents with 2 spaces; the report file
/// format is 4, so this goes through an explicit formatter.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8(buf).expect("serde_json emitted invalid UTF-8"))
}

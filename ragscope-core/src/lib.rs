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

//! # Ragscope Core
//!
//! Shared data contracts for the Ragscope evaluation engine: the input
//! document shapes (conversation and context vectors), the judge verdict,
//! and the evaluation report.
//!
//! Field names and nesting mirror the wire format produced by the chat
//! export and retrieval services; do not rename them.

pub mod context;
pub mod conversation;
pub mod report;

pub use context::{ContextData, ContextDocument, VectorEntry};
pub use conversation::{ConversationDocument, ConversationTurn, Role};
pub use report::{EvaluationReport, JudgeVerdict, ReportInputs, ReportMetrics};

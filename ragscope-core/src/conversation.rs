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

//! Conversation document contract

use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
///
/// The chat export spells the assistant role `"AI/Chatbot"`; `"AI"` is
/// accepted as an alias for producers that shortened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    #[serde(rename = "AI/Chatbot", alias = "AI")]
    Ai,
}

/// A single turn in a conversation. Immutable, caller-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub message: String,
    /// ISO-8601 timestamp string, parsed lazily by the metrics layer.
    pub created_at: String,
}

/// Top-level conversation document.
///
/// Turn order is chronological and significant: the evaluation pipeline
/// locates the most recent user/AI pair by scanning from the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationDocument {
    #[serde(default)]
    pub conversation_turns: Vec<ConversationTurn>,
}

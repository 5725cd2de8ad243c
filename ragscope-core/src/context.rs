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

//! Retrieved-context document contract

use serde::{Deserialize, Serialize};

/// One retrieved passage. The retrieval service attaches scores, ids and
/// raw vectors alongside `text`; only the text participates in evaluation,
/// everything else is ignored on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorEntry {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub vector_data: Vec<VectorEntry>,
}

/// Top-level context document: `{"data": {"vector_data": [{"text": ...}]}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextDocument {
    #[serde(default)]
    pub data: ContextData,
}

impl ContextDocument {
    /// Non-empty chunk texts in retrieval order.
    ///
    /// Entries with empty or missing text are discarded. Order is preserved
    /// for building the concatenated context passed to the judge; grounding
    /// itself is order-insensitive (max over chunks).
    pub fn chunks(&self) -> Vec<String> {
        self.data
            .vector_data
            .iter()
            .filter(|v| !v.text.is_empty())
            .map(|v| v.text.clone())
            .collect()
    }
}

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

//! Degrade-not-fail fallback policy
//!
//! Latency, cost and the judge verdict all share the same contract: a
//! failure never aborts the evaluation, it degrades to a safe default and
//! the cause is logged. One wrapper keeps that contract in one place.

use std::fmt::Display;
use tracing::warn;

/// Resolve `outcome` to its value, or to `fallback(&err)` on failure.
///
/// The failure cause is logged at WARN under the given operation name so
/// degraded metrics stay observable without surfacing to the caller.
pub fn degrade_with<T, E, F>(operation: &str, outcome: Result<T, E>, fallback: F) -> T
where
    E: Display,
    F: FnOnce(&E) -> T,
{
    match outcome {
        Ok(value) => value,
        Err(err) => {
            warn!("{operation} degraded to fallback: {err}");
            fallback(&err)
        }
    }
}

/// [`degrade_with`] for the common case of a fixed fallback value.
pub fn degrade<T, E: Display>(operation: &str, outcome: Result<T, E>, fallback: T) -> T {
    degrade_with(operation, outcome, |_| fallback)
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log parser for the CPU backend.
//!
//! The CPU runner prints compile and per-iteration times inline, in decimal
//! seconds. Only the first compile figure is used: it includes the one-time
//! initialization and tuning that later compilations in the same process
//! reuse. No memory figure is reported.

use crate::aggregate;
use crate::error::{IterationCountMismatch, Result};
use crate::pattern::{self, SecondsMarker};
use crate::{LogText, ParsedLog};
use tracing::debug;

/// Extract metrics from a CPU tool log.
///
/// Unlike the GPU parser, an iteration count mismatch is an error here: the
/// tool did not finish the requested iterations.
pub fn parse(log: &LogText, expected_iterations: u32) -> Result<ParsedLog> {
    let text = log.as_str();

    let compile_time_s = pattern::first_seconds(text, SecondsMarker::CompiledAndRan)?;

    let latencies: Vec<f64> = pattern::capture_seconds(text, SecondsMarker::RunnerExecutionTime)?
        .into_iter()
        .map(|seconds| seconds * 1000.0)
        .collect();
    debug!(samples = latencies.len(), ?compile_time_s, "parsed CPU log");

    if latencies.len() != expected_iterations as usize {
        return Err(IterationCountMismatch::WrongCount {
            expected: expected_iterations,
            found: latencies.len(),
        }
        .into());
    }

    Ok(ParsedLog {
        metrics: aggregate::reduce(&latencies, compile_time_s, expected_iterations, None),
        mismatch: None,
    })
}

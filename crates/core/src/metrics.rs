// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aggregated per-run metrics.
//!
//! Latency figures are in milliseconds, compile time in seconds and memory
//! in megabytes, whatever unit the tool logged them in.
//!
//! Absent latency statistics serialize as `null`: a run without usable
//! latency samples must never look like a run with zero latency. The memory
//! peak is only reported by some backends and is left out of the JSON
//! entirely when there is none.

use serde::{Deserialize, Serialize};

/// Summary of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Total compile time in seconds.
    pub compile_time_s: Option<f64>,
    /// Fastest iteration.
    pub min_latency_ms: Option<f64>,
    /// Slowest iteration.
    pub max_latency_ms: Option<f64>,
    /// Arithmetic mean of all iterations.
    pub mean_latency_ms: Option<f64>,
    /// Median iteration (mean of the two middle values for even counts).
    pub median_latency_ms: Option<f64>,
    /// Sample standard deviation; absent with fewer than two samples.
    pub stddev_latency_ms: Option<f64>,
    /// Number of iterations that were requested from the tool.
    pub benchmark_iterations: u32,
    /// Peak device memory, for backends that report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_memory_peak_mb: Option<f64>,
}

impl MetricsRecord {
    /// Whether any latency statistics are present.
    pub fn has_latencies(&self) -> bool {
        self.mean_latency_ms.is_some()
    }
}

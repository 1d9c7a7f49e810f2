// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reduction of latency samples into a [`MetricsRecord`].

use xla_bench_core::MetricsRecord;

/// Summary statistics over a non-empty latency sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Middle value, or the mean of the two middle values.
    pub median: f64,
    /// Sample (n - 1) standard deviation; `None` for a single sample.
    pub stddev: Option<f64>,
    /// Number of samples.
    pub count: usize,
}

impl LatencyStats {
    /// Compute statistics from samples. Returns `None` when there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let stddev = (n > 1).then(|| {
            let variance = sorted
                .iter()
                .map(|x| {
                    let diff = x - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (n - 1) as f64;
            variance.sqrt()
        });

        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            stddev,
            count: n,
        })
    }
}

/// Merge latency samples with compile-time and memory figures.
///
/// With no samples every latency field is `None`.
pub fn reduce(
    latency_samples: &[f64],
    compile_time_s: Option<f64>,
    iterations: u32,
    peak_memory_mb: Option<f64>,
) -> MetricsRecord {
    let stats = LatencyStats::from_samples(latency_samples);

    MetricsRecord {
        compile_time_s,
        min_latency_ms: stats.map(|s| s.min),
        max_latency_ms: stats.map(|s| s.max),
        mean_latency_ms: stats.map(|s| s.mean),
        median_latency_ms: stats.map(|s| s.median),
        stddev_latency_ms: stats.and_then(|s| s.stddev),
        benchmark_iterations: iterations,
        device_memory_peak_mb: peak_memory_mb,
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result types.
//!
//! A [`ResultRecord`] pairs a benchmark's identity with the metrics of one
//! run. The JSON layout (`definition` plus `metrics.compiler_level`) is shared
//! with the framework-level benchmark drivers that append to the same files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xla_bench_core::{BenchmarkIdentity, MetricsRecord};

/// Metrics grouped by the level they were measured at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetrics {
    /// Metrics measured on the compiler tool directly.
    pub compiler_level: MetricsRecord,
}

/// One benchmark run, as persisted to the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Identity copied from the catalog.
    pub definition: BenchmarkIdentity,
    /// Extracted metrics.
    pub metrics: RecordMetrics,
    /// When the record was assembled. Older result files lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ResultRecord {
    /// Create a new record stamped with the current time.
    pub fn new(definition: BenchmarkIdentity, metrics: MetricsRecord) -> Self {
        Self {
            definition,
            metrics: RecordMetrics {
                compiler_level: metrics,
            },
            recorded_at: Some(Utc::now()),
        }
    }

    /// Name of the benchmark this record belongs to.
    pub fn benchmark_name(&self) -> &str {
        &self.definition.benchmark_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> BenchmarkIdentity {
        BenchmarkIdentity::builder()
            .benchmark_id(format!("id-{name}"))
            .benchmark_name(name)
            .framework("JAX")
            .data_type("fp32")
            .batch_size(1)
            .input("1x224x224x3xf32")
            .output("1x1000xf32")
            .device("c2-standard-16")
            .build()
            .unwrap()
    }

    fn metrics() -> MetricsRecord {
        MetricsRecord {
            compile_time_s: Some(1.23),
            min_latency_ms: Some(100.0),
            max_latency_ms: Some(120.0),
            mean_latency_ms: Some(110.0),
            median_latency_ms: Some(110.0),
            stddev_latency_ms: Some(14.14),
            benchmark_iterations: 2,
            device_memory_peak_mb: None,
        }
    }

    #[test]
    fn test_new_record_is_stamped() {
        let before = Utc::now();
        let record = ResultRecord::new(identity("resnet50"), metrics());
        assert!(record.recorded_at.unwrap() >= before);
        assert_eq!(record.benchmark_name(), "resnet50");
    }

    #[test]
    fn test_json_layout() {
        let record = ResultRecord::new(identity("resnet50"), metrics());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["definition"]["benchmark_name"], "resnet50");
        assert_eq!(value["definition"]["compiler"], "xla");
        assert_eq!(value["metrics"]["compiler_level"]["compile_time_s"], 1.23);
        assert!(value["recorded_at"].is_string());
    }

    #[test]
    fn test_record_without_timestamp_deserializes() {
        let mut value =
            serde_json::to_value(ResultRecord::new(identity("bert"), metrics())).unwrap();
        value.as_object_mut().unwrap().remove("recorded_at");
        let record: ResultRecord = serde_json::from_value(value).unwrap();
        assert!(record.recorded_at.is_none());
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Durable storage for benchmark results.
//!
//! Results live in a JSON file of the form `{"benchmarks": [...]}`. Other
//! benchmark drivers append to the same file, so appending keeps every
//! existing entry and any other top-level keys untouched, and only ever adds
//! to the end of the list.

use crate::result::ResultRecord;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level key holding the list of results.
pub const BENCHMARKS_KEY: &str = "benchmarks";

/// Errors that can occur while reading or writing results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file or a record is not valid JSON for its expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is valid JSON but not a result file.
    #[error("Invalid result file {path}: {reason}")]
    InvalidLayout {
        /// File being read.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Append-only destination for result records.
pub trait ResultSink {
    /// Append one record after all previously appended ones.
    fn append(&mut self, record: &ResultRecord) -> Result<()>;
}

/// Result store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    /// Use the result file at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the result file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry, including ones written by other drivers.
    pub fn entries(&self) -> Result<Vec<Value>> {
        let mut document = self.load_document()?;
        match document.remove(BENCHMARKS_KEY) {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Ok(Vec::new()),
        }
    }

    /// Read all entries as [`ResultRecord`]s, in the order they were appended.
    pub fn records(&self) -> Result<Vec<ResultRecord>> {
        self.entries()?
            .into_iter()
            .map(|entry| serde_json::from_value(entry).map_err(StoreError::from))
            .collect()
    }

    fn load_document(&self) -> Result<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(document) => {
                if let Some(entries) = document.get(BENCHMARKS_KEY) {
                    if !entries.is_array() {
                        return Err(self.invalid("`benchmarks` is not an array"));
                    }
                }
                Ok(document)
            }
            _ => Err(self.invalid("top level is not an object")),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)
    }

    fn invalid(&self, reason: &str) -> StoreError {
        StoreError::InvalidLayout {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ResultSink for JsonResultStore {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        let mut document = self.load_document()?;
        let entry = serde_json::to_value(record)?;

        match document
            .entry(BENCHMARKS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(entries) => entries.push(entry),
            _ => return Err(self.invalid("`benchmarks` is not an array")),
        }
        self.write_document(&document)
    }
}

/// Read all records from the result file at `path`.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    JsonResultStore::new(path.as_ref()).records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xla_bench_core::{BenchmarkIdentity, MetricsRecord};

    fn record(name: &str, mean: Option<f64>) -> ResultRecord {
        let identity = BenchmarkIdentity::builder()
            .benchmark_id(format!("id-{name}"))
            .benchmark_name(name)
            .framework("JAX")
            .data_type("fp32")
            .batch_size(1)
            .device("a2-highgpu-1g")
            .build()
            .unwrap();
        ResultRecord::new(
            identity,
            MetricsRecord {
                compile_time_s: Some(0.5),
                min_latency_ms: mean,
                max_latency_ms: mean,
                mean_latency_ms: mean,
                median_latency_ms: mean,
                stddev_latency_ms: None,
                benchmark_iterations: 1,
                device_memory_peak_mb: Some(64.0),
            },
        )
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let mut store = JsonResultStore::new(&path);

        store.append(&record("a", Some(1.0))).unwrap();

        assert!(path.exists());
        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].benchmark_name(), "a");
    }

    #[test]
    fn test_append_preserves_order_and_prior_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut store = JsonResultStore::new(&path);

        for name in ["first", "second", "third"] {
            store.append(&record(name, Some(2.0))).unwrap();
        }

        let names: Vec<String> = read_records(&path)
            .unwrap()
            .iter()
            .map(|r| r.benchmark_name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_append_keeps_foreign_entries_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(
            &path,
            r#"{"commit": "abc123", "benchmarks": [{"definition": {"benchmark_name": "jax"}, "metrics": {"framework_level": {}}}]}"#,
        )
        .unwrap();

        let mut store = JsonResultStore::new(&path);
        store.append(&record("xla", None)).unwrap();

        let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document["commit"], "abc123");
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["definition"]["benchmark_name"], "jax");
        assert_eq!(entries[1]["definition"]["benchmark_name"], "xla");
        assert!(entries[1]["metrics"]["compiler_level"]["mean_latency_ms"].is_null());
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::new(dir.path().join("absent.json"));
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "").unwrap();
        assert!(read_records(&path).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let mut store = JsonResultStore::new(&path);
        let err = store.append(&record("a", Some(1.0))).unwrap_err();
        assert!(matches!(err, StoreError::InvalidLayout { .. }));
        // The file is left as it was.
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_rejects_non_array_benchmarks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, r#"{"benchmarks": {}}"#).unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("not an array"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        JsonResultStore::new(&path)
            .append(&record("a", Some(1.0)))
            .unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

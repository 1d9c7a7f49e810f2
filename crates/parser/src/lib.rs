// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metrics extraction from XLA benchmarking tool logs.
//!
//! The benchmarking tools report their measurements only through free-form
//! diagnostic logs. This crate turns a captured log into a
//! [`MetricsRecord`]:
//!
//! ```
//! use xla_bench_core::DeviceClass;
//! use xla_bench_parser::{parse_log, LogText};
//!
//! let log = LogText::from(
//!     "... compiled and ran in 1.23s.\n\
//!      execution time for runner cpu: 0.10s.\n\
//!      execution time for runner cpu: 0.12s.\n",
//! );
//! let parsed = parse_log(DeviceClass::Cpu, &log, 2).unwrap();
//! assert_eq!(parsed.metrics.compile_time_s, Some(1.23));
//! assert_eq!(parsed.metrics.min_latency_ms, Some(100.0));
//! ```
//!
//! # Modules
//!
//! - [`timestamp`] - log line timestamps and rollover-corrected elapsed time
//! - [`pattern`] - the log vocabulary and text extraction helpers
//! - [`accelerator`] - parser for the GPU backend
//! - [`host`] - parser for the CPU backend
//! - [`aggregate`] - latency statistics

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod accelerator;
pub mod aggregate;
pub mod error;
pub mod host;
pub mod pattern;
pub mod timestamp;

pub use error::{IterationCountMismatch, ParseError, Result};

use xla_bench_core::{DeviceClass, MetricsRecord};

/// Snapshot of a tool's combined output streams.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogText(String);

impl LogText {
    /// Decode raw tool output. Invalid UTF-8 is replaced, marker lines are ASCII.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self(text),
            Err(err) => Self(String::from_utf8_lossy(err.as_bytes()).into_owned()),
        }
    }

    /// The log as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of lines in the log.
    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl From<String> for LogText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for LogText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for LogText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metrics extracted from one log.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    /// Aggregated metrics.
    pub metrics: MetricsRecord,
    /// Set when the latency samples were discarded because the markers did
    /// not match the requested iteration count.
    pub mismatch: Option<IterationCountMismatch>,
}

/// Extract metrics from `log` with the parser for `device`.
pub fn parse_log(device: DeviceClass, log: &LogText, expected_iterations: u32) -> Result<ParsedLog> {
    match device {
        DeviceClass::Gpu => accelerator::parse(log, expected_iterations),
        DeviceClass::Cpu => host::parse(log, expected_iterations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_text_from_valid_bytes() {
        let log = LogText::from_bytes(b"line one\nline two\n".to_vec());
        assert_eq!(log.as_str(), "line one\nline two\n");
        assert_eq!(log.line_count(), 2);
    }

    #[test]
    fn test_log_text_replaces_invalid_utf8() {
        let mut bytes = b"execution time for runner cpu: 0.5s.\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let log = LogText::from_bytes(bytes);
        assert!(log.as_str().contains('\u{FFFD}'));
        assert!(log.as_str().starts_with("execution time"));
    }

    #[test]
    fn test_parse_log_dispatches_on_device() {
        let cpu_log = LogText::from("execution time for runner cpu: 0.5s.\n");
        let parsed = parse_log(DeviceClass::Cpu, &cpu_log, 1).unwrap();
        assert_eq!(parsed.metrics.mean_latency_ms, Some(500.0));
        assert!(parsed.metrics.device_memory_peak_mb.is_none());

        // The same text has none of the GPU vocabulary.
        let err = parse_log(DeviceClass::Gpu, &cpu_log, 1).unwrap_err();
        assert!(matches!(err, ParseError::MetricNotFound { .. }));
    }
}

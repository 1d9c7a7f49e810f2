// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while extracting metrics from tool logs.
//!
//! Two kinds of failure are kept apart on purpose. A malformed timestamp on
//! a marker line means the tool broke its log contract. A wrong number of
//! iterations means the tool run itself failed or stopped early.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for log parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// The log does not contain exactly one latency sample per requested iteration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IterationCountMismatch {
    /// Start and stop markers do not pair up.
    #[error("unequal number of start and stop logs: {starts} start logs != {stops} stop logs")]
    UnpairedMarkers {
        /// Number of start markers found.
        starts: usize,
        /// Number of stop markers found.
        stops: usize,
    },
    /// Samples pair up but their number differs from the request.
    #[error("expected {expected} iterations, found {found}")]
    WrongCount {
        /// Iterations requested from the tool.
        expected: u32,
        /// Samples found in the log.
        found: usize,
    },
}

/// Errors that can occur while parsing a tool log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A marker line does not start with the `YYYY-MM-DD HH:MM:SS.ffffff:` prefix.
    #[error("Unable to parse log time: {line}")]
    MalformedTimestamp {
        /// The offending line.
        line: String,
    },

    /// An expected metric is absent from the log.
    #[error("Metric not found in log: {metric}")]
    MetricNotFound {
        /// Which metric was looked for.
        metric: &'static str,
    },

    /// Iteration count in the log differs from the request.
    #[error("Iteration count mismatch: {0}")]
    IterationCountMismatch(#[from] IterationCountMismatch),

    /// A captured value is not a number.
    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber {
        /// Which value was being read.
        field: &'static str,
        /// The captured text.
        value: String,
    },
}

impl ParseError {
    /// Whether the error means the tool broke its log format contract,
    /// as opposed to the run producing incomplete data.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::MalformedTimestamp { .. } | Self::InvalidNumber { .. }
        )
    }
}

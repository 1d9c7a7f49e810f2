// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log vocabulary and pattern extraction.
//!
//! Every literal string the parsers depend on lives here, so a change in
//! the tool's log format only touches this module. Patterns are compiled
//! once on first use.

use crate::error::{ParseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time: (\d+\.?\d*) (us|ms|s|min|h)").expect("valid duration pattern")
});

static SIZE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" (\d+) bytes").expect("valid size pattern"));

static EXECUTION_STARTED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^.+HloRunner: ExecuteOnDevices started.*$").expect("valid start marker")
});

static EXECUTION_SUCCEEDED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^.+HloRunner: ExecuteOnDevices succeeded.*$").expect("valid stop marker")
});

static PTX_COMPILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"NVPTXCompiler::CompileTargetBinary - CompileToPtx.*")
        .expect("valid compile marker")
});

static PEAK_MEMORY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"New Peak memory usage of \d+ bytes for GPU").expect("valid memory marker")
});

static COMPILED_AND_RAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"compiled and ran in (\S+?)s\b").expect("valid compile-and-run pattern")
});

static RUNNER_EXECUTION_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"execution time for runner \w*: (\S+?)s\b").expect("valid runner time pattern")
});

/// Units a logged duration may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// `us`
    Microseconds,
    /// `ms`
    Milliseconds,
    /// `s`
    Seconds,
    /// `min`
    Minutes,
    /// `h`
    Hours,
}

impl DurationUnit {
    /// Parse a unit token as it appears in the log.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "us" => Some(Self::Microseconds),
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            "min" => Some(Self::Minutes),
            "h" => Some(Self::Hours),
            _ => None,
        }
    }

    /// Token used in the log.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
        }
    }

    /// Factor converting a value in this unit to milliseconds.
    pub fn millis_factor(&self) -> f64 {
        match self {
            Self::Microseconds => 1e-3,
            Self::Milliseconds => 1.0,
            Self::Seconds => 1e3,
            Self::Minutes => 60.0 * 1e3,
            Self::Hours => 3600.0 * 1e3,
        }
    }
}

/// A duration as it was logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggedDuration {
    /// Numeric value in `unit`.
    pub value: f64,
    /// Unit the value was logged in.
    pub unit: DurationUnit,
}

impl LoggedDuration {
    /// The duration in milliseconds.
    pub fn as_millis(&self) -> f64 {
        self.value * self.unit.millis_factor()
    }
}

/// A byte count as it was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// The size in (decimal) megabytes.
    pub fn as_megabytes(&self) -> f64 {
        self.0 as f64 * 1e-6
    }
}

/// Whole-line or whole-phrase markers whose presence signals an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Timestamped line logged when an iteration starts executing.
    ExecutionStarted,
    /// Timestamped line logged when an iteration finished successfully.
    ExecutionSucceeded,
    /// PTX compilation announcement carrying a `time: <n> <unit>` field.
    PtxCompile,
    /// Allocator announcement of a new device memory peak.
    PeakMemory,
}

impl Marker {
    fn regex(&self) -> &'static Regex {
        match self {
            Self::ExecutionStarted => &EXECUTION_STARTED_REGEX,
            Self::ExecutionSucceeded => &EXECUTION_SUCCEEDED_REGEX,
            Self::PtxCompile => &PTX_COMPILE_REGEX,
            Self::PeakMemory => &PEAK_MEMORY_REGEX,
        }
    }
}

/// Markers carrying an inline decimal-seconds value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondsMarker {
    /// `compiled and ran in <s>s`, logged once per compilation.
    CompiledAndRan,
    /// `execution time for runner <name>: <s>s`, logged once per iteration.
    RunnerExecutionTime,
}

impl SecondsMarker {
    fn regex(&self) -> &'static Regex {
        match self {
            Self::CompiledAndRan => &COMPILED_AND_RAN_REGEX,
            Self::RunnerExecutionTime => &RUNNER_EXECUTION_TIME_REGEX,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Self::CompiledAndRan => "compile time",
            Self::RunnerExecutionTime => "runner execution time",
        }
    }
}

/// Find the first `time: <number> <unit>` field in `text`.
pub fn find_duration(text: &str) -> Result<LoggedDuration> {
    let captures = TIME_REGEX
        .captures(text)
        .ok_or(ParseError::MetricNotFound { metric: "duration" })?;
    let value = parse_number(&captures[1], "duration")?;
    let unit = DurationUnit::from_token(&captures[2])
        .ok_or(ParseError::MetricNotFound { metric: "duration unit" })?;
    Ok(LoggedDuration { value, unit })
}

/// Find the first `<digits> bytes` field in `text`.
pub fn find_size(text: &str) -> Result<ByteSize> {
    let captures = SIZE_REGEX
        .captures(text)
        .ok_or(ParseError::MetricNotFound { metric: "size" })?;
    let digits = &captures[1];
    digits
        .parse::<u64>()
        .map(ByteSize)
        .map_err(|_| ParseError::InvalidNumber {
            field: "size",
            value: digits.to_string(),
        })
}

/// Every non-overlapping occurrence of `marker`, in order of appearance.
pub fn find_all(text: &str, marker: Marker) -> Vec<&str> {
    marker
        .regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// The seconds value of every occurrence of `marker`, in order of appearance.
pub fn capture_seconds(text: &str, marker: SecondsMarker) -> Result<Vec<f64>> {
    marker
        .regex()
        .captures_iter(text)
        .map(|captures| parse_number(&captures[1], marker.field()))
        .collect()
}

/// The seconds value of the first occurrence of `marker`, if any.
///
/// Later occurrences are not read.
pub fn first_seconds(text: &str, marker: SecondsMarker) -> Result<Option<f64>> {
    marker
        .regex()
        .captures(text)
        .map(|captures| parse_number(&captures[1], marker.field()))
        .transpose()
}

fn parse_number(raw: &str, field: &'static str) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

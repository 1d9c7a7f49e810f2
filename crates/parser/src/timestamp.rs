// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log line timestamps.
//!
//! Tool log lines start with `YYYY-MM-DD HH:MM:SS.ffffff:`. Only the time of
//! day is used; elapsed times are computed on milliseconds since midnight and
//! corrected for a single midnight crossing.

use crate::error::{ParseError, Result};
use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

static LOG_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} (\d{2}:\d{2}:\d{2}\.\d+):").expect("valid log time pattern")
});

/// Time of day of a log line, in milliseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Parse the timestamp prefix of a log line.
    ///
    /// The date is matched but ignored. A missing or out-of-range prefix is a
    /// [`ParseError::MalformedTimestamp`].
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = || ParseError::MalformedTimestamp {
            line: line.to_string(),
        };
        let captures = LOG_TIME_REGEX.captures(line).ok_or_else(malformed)?;
        let time = NaiveTime::parse_from_str(&captures[1], "%H:%M:%S%.f")
            .map_err(|_| malformed())?;
        // chrono folds a leap second into the nanoseconds.
        if time.nanosecond() >= 1_000_000_000 {
            return Err(malformed());
        }

        let millis = f64::from(time.num_seconds_from_midnight()) * 1000.0
            + f64::from(time.nanosecond()) / 1_000_000.0;
        Ok(Self(millis))
    }

    /// Build a timestamp from milliseconds since midnight.
    ///
    /// Returns `None` outside `[0, MS_PER_DAY)`.
    pub fn from_millis(millis: f64) -> Option<Self> {
        (0.0..MS_PER_DAY).contains(&millis).then_some(Self(millis))
    }

    /// Milliseconds since midnight.
    pub fn millis(&self) -> f64 {
        self.0
    }
}

/// Milliseconds from `start` to `end`.
///
/// A negative difference is taken to mean the interval crossed midnight once,
/// so one day is added. Intervals longer than a day cannot be told apart from
/// shorter ones and are not supported.
pub fn elapsed_ms(start: Timestamp, end: Timestamp) -> f64 {
    let elapsed = end.0 - start.0;
    if elapsed < 0.0 {
        elapsed + MS_PER_DAY
    } else {
        elapsed
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log parser for the GPU backend.
//!
//! The GPU runner logs a timestamped line when each iteration starts and
//! another when it succeeds; latency is the time between the two. Compile
//! time comes from the PTX compiler's VLOG timing lines and memory from the
//! allocator's peak announcements.

use crate::aggregate;
use crate::error::{IterationCountMismatch, ParseError, Result};
use crate::pattern::{self, Marker};
use crate::timestamp::{elapsed_ms, Timestamp};
use crate::{LogText, ParsedLog};
use tracing::debug;

/// Extract metrics from a GPU tool log.
///
/// A marker count that does not match `expected_iterations` discards all
/// latency samples and is reported in [`ParsedLog::mismatch`]; compile time
/// and memory are still extracted.
pub fn parse(log: &LogText, expected_iterations: u32) -> Result<ParsedLog> {
    let text = log.as_str();

    let (latencies, mismatch) = match parse_latencies(text, expected_iterations) {
        Ok(latencies) => (latencies, None),
        Err(ParseError::IterationCountMismatch(mismatch)) => {
            debug!(%mismatch, "discarding GPU latency samples");
            (Vec::new(), Some(mismatch))
        }
        Err(err) => return Err(err),
    };
    let compile_time_s = parse_compile_time(text)?;
    let peak_memory_mb = parse_peak_memory(text)?;

    Ok(ParsedLog {
        metrics: aggregate::reduce(
            &latencies,
            Some(compile_time_s),
            expected_iterations,
            Some(peak_memory_mb),
        ),
        mismatch,
    })
}

/// Latencies in milliseconds, one per start/stop marker pair.
pub fn parse_latencies(text: &str, expected_iterations: u32) -> Result<Vec<f64>> {
    let starts = pattern::find_all(text, Marker::ExecutionStarted);
    let stops = pattern::find_all(text, Marker::ExecutionSucceeded);
    debug!(starts = starts.len(), stops = stops.len(), "found latency markers");

    if starts.len() != stops.len() {
        return Err(IterationCountMismatch::UnpairedMarkers {
            starts: starts.len(),
            stops: stops.len(),
        }
        .into());
    }
    if starts.len() != expected_iterations as usize {
        return Err(IterationCountMismatch::WrongCount {
            expected: expected_iterations,
            found: starts.len(),
        }
        .into());
    }

    starts
        .iter()
        .zip(&stops)
        .map(|(start, stop)| Ok(elapsed_ms(Timestamp::parse(start)?, Timestamp::parse(stop)?)))
        .collect()
}

/// Sum of all PTX compile announcements, in seconds.
pub fn parse_compile_time(text: &str) -> Result<f64> {
    let announcements = pattern::find_all(text, Marker::PtxCompile);
    debug!(count = announcements.len(), "found compile announcements");

    let total_ms = announcements
        .iter()
        .map(|line| pattern::find_duration(line).map(|d| d.as_millis()))
        .sum::<Result<f64>>()?;
    Ok(total_ms * 1e-3)
}

/// The last reported memory peak, in megabytes.
pub fn parse_peak_memory(text: &str) -> Result<f64> {
    let last = pattern::find_all(text, Marker::PeakMemory)
        .pop()
        .ok_or(ParseError::MetricNotFound {
            metric: "device memory peak",
        })?;
    Ok(pattern::find_size(last)?.as_megabytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNER: &str = "I xla/tools/multihost_hlo_runner/functional_hlo_runner.cc:517]";

    fn start(time: &str) -> String {
        format!("2023-06-05 {time}: {RUNNER} HloRunner: ExecuteOnDevices started (Attempt 1)\n")
    }

    fn stop(time: &str) -> String {
        format!("2023-06-05 {time}: {RUNNER} HloRunner: ExecuteOnDevices succeeded\n")
    }

    fn compile(amount: &str) -> String {
        format!(
            "2023-06-05 10:00:00.000000: I xla/service/gpu/nvptx_compiler.cc:623] \
             NVPTXCompiler::CompileTargetBinary - CompileToPtx time: {amount} (cumulative: 1 s)\n"
        )
    }

    fn peak(bytes: u64) -> String {
        format!(
            "2023-06-05 10:00:00.500000: I xla/tsl/framework/bfc_allocator.cc:1113] \
             New Peak memory usage of {bytes} bytes for GPU\n"
        )
    }

    fn log_with_pairs(pairs: &[(&str, &str)]) -> String {
        let mut text = String::new();
        text.push_str(&compile("120 ms"));
        text.push_str(&compile("380 ms"));
        text.push_str(&peak(1_000_000));
        for (t_start, t_stop) in pairs {
            text.push_str("2023-06-05 10:00:00.600000: I some/other.cc:1] unrelated chatter\n");
            text.push_str(&start(t_start));
            text.push_str(&stop(t_stop));
        }
        text.push_str(&peak(3_000_000));
        text
    }

    #[test]
    fn test_three_pairs_give_pairwise_latencies() {
        let text = log_with_pairs(&[
            ("10:00:01.000000", "10:00:01.250000"),
            ("10:00:02.000000", "10:00:02.500000"),
            ("10:00:03.000000", "10:00:04.000000"),
        ]);
        let latencies = parse_latencies(&text, 3).unwrap();
        assert_eq!(latencies, vec![250.0, 500.0, 1000.0]);
    }

    #[test]
    fn test_full_parse() {
        let text = log_with_pairs(&[
            ("10:00:01.000000", "10:00:01.250000"),
            ("10:00:02.000000", "10:00:02.500000"),
            ("10:00:03.000000", "10:00:04.000000"),
        ]);
        let parsed = parse(&LogText::from(text), 3).unwrap();
        assert!(parsed.mismatch.is_none());

        let metrics = parsed.metrics;
        assert_eq!(metrics.benchmark_iterations, 3);
        assert_eq!(metrics.min_latency_ms, Some(250.0));
        assert_eq!(metrics.max_latency_ms, Some(1000.0));
        assert_eq!(metrics.median_latency_ms, Some(500.0));
        assert!((metrics.compile_time_s.unwrap() - 0.5).abs() < 1e-12);
        // Last peak announcement wins.
        assert_eq!(metrics.device_memory_peak_mb, Some(3.0));
    }

    #[test]
    fn test_latency_across_midnight() {
        let text = log_with_pairs(&[("23:59:59.800000", "00:00:00.300000")]);
        let latencies = parse_latencies(&text, 1).unwrap();
        assert_eq!(latencies.len(), 1);
        assert!((latencies[0] - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_unpaired_markers_discard_all_samples() {
        let mut text = log_with_pairs(&[
            ("10:00:01.000000", "10:00:01.100000"),
            ("10:00:02.000000", "10:00:02.100000"),
            ("10:00:03.000000", "10:00:03.100000"),
            ("10:00:04.000000", "10:00:04.100000"),
        ]);
        text.push_str(&start("10:00:05.000000"));

        let parsed = parse(&LogText::from(text), 5).unwrap();
        assert_eq!(
            parsed.mismatch,
            Some(IterationCountMismatch::UnpairedMarkers { starts: 5, stops: 4 })
        );
        assert_eq!(parsed.metrics.min_latency_ms, None);
        assert_eq!(parsed.metrics.mean_latency_ms, None);
        assert_eq!(parsed.metrics.stddev_latency_ms, None);
        assert_eq!(parsed.metrics.benchmark_iterations, 5);
        assert_eq!(parsed.metrics.device_memory_peak_mb, Some(3.0));
    }

    #[test]
    fn test_wrong_iteration_count_discards_all_samples() {
        let text = log_with_pairs(&[
            ("10:00:01.000000", "10:00:01.100000"),
            ("10:00:02.000000", "10:00:02.100000"),
        ]);
        let parsed = parse(&LogText::from(text), 3).unwrap();
        assert_eq!(
            parsed.mismatch,
            Some(IterationCountMismatch::WrongCount { expected: 3, found: 2 })
        );
        assert!(!parsed.metrics.has_latencies());
    }

    #[test]
    fn test_marker_without_timestamp_is_malformed() {
        let mut text = log_with_pairs(&[]);
        text.push_str("W HloRunner: ExecuteOnDevices started\n");
        text.push_str(&stop("10:00:01.000000"));
        let err = parse(&LogText::from(text), 1).unwrap_err();
        assert!(matches!(err, ParseError::MalformedTimestamp { .. }));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_no_compile_announcements_sum_to_zero() {
        assert_eq!(parse_compile_time("nothing compiled").unwrap(), 0.0);
    }

    #[test]
    fn test_compile_time_mixes_units() {
        let text = format!("{}{}", compile("1.5 s"), compile("500 us"));
        let seconds = parse_compile_time(&text).unwrap();
        assert!((seconds - 1.5005).abs() < 1e-12);
    }

    #[test]
    fn test_compile_announcement_without_time_fails() {
        let text = "NVPTXCompiler::CompileTargetBinary - CompileToPtx started\n";
        let err = parse_compile_time(text).unwrap_err();
        assert_eq!(err, ParseError::MetricNotFound { metric: "duration" });
    }

    #[test]
    fn test_missing_peak_memory_fails() {
        let err = parse_peak_memory(&compile("1 ms")).unwrap_err();
        assert_eq!(
            err,
            ParseError::MetricNotFound {
                metric: "device memory peak"
            }
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = LogText::from(log_with_pairs(&[
            ("10:00:01.000000", "10:00:01.333000"),
            ("10:00:02.000000", "10:00:02.777000"),
        ]));
        assert_eq!(parse(&text, 2).unwrap(), parse(&text, 2).unwrap());
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! XLA compiler benchmark runner.
//!
//! This crate runs benchmarks from a catalog against an external
//! benchmarking tool and appends one result record per benchmark to a
//! result file.
//!
//! # Quick Start
//!
//! ```no_run
//! use xla_bench_benchmarks::{run_batch, BenchmarkRunner, Catalog, JsonResultStore, RunnerSettings};
//!
//! let settings = RunnerSettings::load(None)?;
//! let catalog = Catalog::load("catalog.toml")?;
//! let cases = catalog.select("models/RESNET50_.*")?;
//!
//! let runner = BenchmarkRunner::new(settings);
//! let mut store = JsonResultStore::new("results.json");
//! let summary = run_batch(&runner, &cases, &mut store);
//!
//! println!("{} succeeded, {} failed", summary.succeeded.len(), summary.failed.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - benchmark definitions and selection
//! - [`settings`] - layered runner configuration
//! - [`runner`] - tool invocation and log parsing for one benchmark
//! - [`result`] - the persisted `ResultRecord`
//! - [`io`] - the append-only JSON result store

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod io;
pub mod result;
pub mod runner;
pub mod settings;

pub use catalog::{BenchmarkCase, Catalog, CatalogError};
pub use io::{JsonResultStore, ResultSink, StoreError};
pub use result::{RecordMetrics, ResultRecord};
pub use runner::{BenchmarkRunner, ProcessInvoker, RunOutcome, RunnerError, ToolInvoker};
pub use settings::{RunnerSettings, SettingsError};

use serde::Serialize;
use tracing::{error, info};
use xla_bench_parser::IterationCountMismatch;

/// A benchmark that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBenchmark {
    /// Benchmark name.
    pub name: String,
    /// Why it failed.
    pub error: String,
    /// Whether the tool's log broke its format contract.
    pub contract_violation: bool,
}

/// A benchmark whose record was stored without latency statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchedBenchmark {
    /// Benchmark name.
    pub name: String,
    /// What did not add up.
    pub mismatch: IterationCountMismatch,
}

/// Per-benchmark outcomes of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Benchmarks stored with complete metrics.
    pub succeeded: Vec<String>,
    /// Benchmarks stored with latency statistics discarded.
    pub mismatched: Vec<MismatchedBenchmark>,
    /// Benchmarks without a stored record.
    pub failed: Vec<FailedBenchmark>,
}

impl BatchSummary {
    /// Whether every benchmark was stored with complete metrics.
    pub fn all_passed(&self) -> bool {
        self.mismatched.is_empty() && self.failed.is_empty()
    }

    /// Number of benchmarks in the batch.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.mismatched.len() + self.failed.len()
    }
}

/// Run benchmarks one after another, appending each record to `sink`.
///
/// A failing benchmark is recorded in the summary and the batch moves on to
/// the next one.
pub fn run_batch<I: ToolInvoker>(
    runner: &BenchmarkRunner<I>,
    cases: &[&BenchmarkCase],
    sink: &mut dyn ResultSink,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for case in cases {
        let name = case.name().to_string();
        let stored = runner.run(case).and_then(|outcome| {
            sink.append(&outcome.record)?;
            Ok(outcome)
        });

        match stored {
            Ok(RunOutcome {
                mismatch: Some(mismatch),
                ..
            }) => {
                error!(benchmark = %name, %mismatch, "stored without latency statistics");
                summary.mismatched.push(MismatchedBenchmark { name, mismatch });
            }
            Ok(_) => {
                info!(benchmark = %name, "benchmark finished");
                summary.succeeded.push(name);
            }
            Err(err) => {
                let contract_violation = err.is_contract_violation();
                error!(benchmark = %name, error = %err, contract_violation, "benchmark failed");
                summary.failed.push(FailedBenchmark {
                    name,
                    error: err.to_string(),
                    contract_violation,
                });
            }
        }
    }

    summary
}

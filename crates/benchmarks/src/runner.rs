// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Running one benchmark against the external tool.
//!
//! For each benchmark the runner resolves the device class, builds the
//! device-specific tool command line, runs the tool to completion with its
//! stdout and stderr merged into one pipe, and hands the captured log to the
//! matching parser.

use crate::catalog::BenchmarkCase;
use crate::io::StoreError;
use crate::result::ResultRecord;
use crate::settings::RunnerSettings;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};
use xla_bench_core::{DeviceClass, UnsupportedAccelerator};
use xla_bench_parser::{parse_log, IterationCountMismatch, LogText, ParseError};

/// Errors that can fail a single benchmark.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The benchmark targets a backend without a parser.
    #[error(transparent)]
    UnsupportedAccelerator(#[from] UnsupportedAccelerator),

    /// No tool binary was configured.
    #[error("No benchmarking tool configured (set --hlo-tool or hlo_tool)")]
    MissingTool,

    /// The HLO dump for the benchmark is not on disk.
    #[error("HLO dump not found: '{}'", .0.display())]
    MissingArtifact(PathBuf),

    /// The tool could not be started or its output could not be read.
    #[error("Failed to run {}: {source}", .program.display())]
    Tool {
        /// Tool binary.
        program: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The log did not yield metrics.
    #[error("Failed to parse tool output: {0}")]
    Parse(#[from] ParseError),

    /// The result could not be stored.
    #[error("Failed to store result: {0}")]
    Store(#[from] StoreError),
}

impl RunnerError {
    /// Whether the tool's log broke its format contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Parse(err) if err.is_contract_violation())
    }
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// A fully specified tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Tool binary.
    pub program: PathBuf,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Environment variables added to the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Captured output of a finished tool run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Combined stdout and stderr, in the order the tool wrote them.
    pub log: Vec<u8>,
    /// Exit code, if the tool exited normally.
    pub exit_code: Option<i32>,
    /// Whether the tool reported success.
    pub success: bool,
}

/// Runs the external tool.
#[cfg_attr(test, mockall::automock)]
pub trait ToolInvoker {
    /// Run the tool to completion and capture all of its output.
    fn invoke(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput>;
}

/// [`ToolInvoker`] spawning a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput> {
        let (mut reader, writer) = io::pipe()?;
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stderr(writer.try_clone()?)
            .stdout(writer);

        let mut child = command.spawn()?;
        // The command still owns the write ends; the read below only sees
        // EOF once they are closed.
        drop(command);

        let mut log = Vec::new();
        let read = reader.read_to_end(&mut log);
        reap_on_error(&mut child, read)?;
        let status = child.wait()?;

        Ok(ToolOutput {
            log,
            exit_code: status.code(),
            success: status.success(),
        })
    }
}

/// Kill and reap `child` when `result` is an error, then pass `result` on.
fn reap_on_error<T>(child: &mut Child, result: io::Result<T>) -> io::Result<T> {
    if result.is_err() {
        let _ = child.kill();
        let _ = child.wait();
    }
    result
}

/// Outcome of one successful benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The record to persist.
    pub record: ResultRecord,
    /// Set when latency samples were discarded for a marker count mismatch.
    pub mismatch: Option<IterationCountMismatch>,
}

/// Runs benchmarks through a [`ToolInvoker`].
#[derive(Debug, Clone)]
pub struct BenchmarkRunner<I = ProcessInvoker> {
    settings: RunnerSettings,
    invoker: I,
}

impl BenchmarkRunner<ProcessInvoker> {
    /// Runner spawning real tool processes.
    pub fn new(settings: RunnerSettings) -> Self {
        Self::with_invoker(settings, ProcessInvoker)
    }
}

impl<I: ToolInvoker> BenchmarkRunner<I> {
    /// Runner using a custom invoker.
    pub fn with_invoker(settings: RunnerSettings, invoker: I) -> Self {
        Self { settings, invoker }
    }

    /// The runner's settings.
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Command line and environment for running `hlo_dump` on `device`.
    pub fn invocation(&self, device: DeviceClass, hlo_dump: &Path) -> Result<ToolInvocation> {
        let program = self.settings.hlo_tool.clone().ok_or(RunnerError::MissingTool)?;
        let iterations = self.settings.iterations;
        let dump = hlo_dump.display();

        let invocation = match device {
            DeviceClass::Gpu => ToolInvocation {
                program,
                args: vec![
                    format!("--hlo_file={dump}"),
                    format!("--device_type={device}"),
                    format!("--num_repeats={iterations}"),
                    "--input_format=text".to_string(),
                    "--num_replicas=1".to_string(),
                    "--num_partitions=1".to_string(),
                    "--logtostderr".to_string(),
                ],
                // Timings are only logged under VLOG for these modules.
                env: vec![
                    (
                        "TF_CPP_MIN_LOG_LEVEL".to_string(),
                        self.settings.min_log_level.clone(),
                    ),
                    ("TF_CPP_VMODULE".to_string(), self.settings.gpu_vmodule.clone()),
                ],
            },
            DeviceClass::Cpu => ToolInvocation {
                program,
                args: vec![
                    "--input_format=hlo".to_string(),
                    format!("--platform={device}"),
                    "--reference_platform=".to_string(),
                    "--logtostderr".to_string(),
                    format!("--input_module={dump}"),
                    format!("--iterations={iterations}"),
                ],
                env: Vec::new(),
            },
        };
        Ok(invocation)
    }

    /// Run one benchmark and build its result record.
    ///
    /// Unsupported accelerators fail before the tool is started.
    pub fn run(&self, case: &BenchmarkCase) -> Result<RunOutcome> {
        let device = case.device_class()?;
        let hlo_dump = case.hlo_dump_path(&self.settings.root_dir, &self.settings.hlo_filename);
        if !hlo_dump.exists() {
            return Err(RunnerError::MissingArtifact(hlo_dump));
        }
        self.run_dump(case, device, &hlo_dump)
    }

    fn run_dump(
        &self,
        case: &BenchmarkCase,
        device: DeviceClass,
        hlo_dump: &Path,
    ) -> Result<RunOutcome> {
        let invocation = self.invocation(device, hlo_dump)?;
        info!(benchmark = case.name(), %device, iterations = self.settings.iterations, "running benchmark");
        debug!(program = %invocation.program.display(), args = ?invocation.args, "invoking tool");

        let output = self
            .invoker
            .invoke(&invocation)
            .map_err(|source| RunnerError::Tool {
                program: invocation.program.clone(),
                source,
            })?;
        if !output.success {
            warn!(
                benchmark = case.name(),
                exit_code = ?output.exit_code,
                "tool exited unsuccessfully, parsing its output anyway"
            );
        }

        let log = LogText::from_bytes(output.log);
        debug!(lines = log.line_count(), "captured tool output");
        let parsed = parse_log(device, &log, self.settings.iterations)?;

        Ok(RunOutcome {
            record: ResultRecord::new(case.identity.clone(), parsed.metrics),
            mismatch: parsed.mismatch,
        })
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for XLA Bench.
//!
//! This crate provides the `xla-bench` command: running catalog benchmarks
//! against the benchmarking tool, listing the catalog, and extracting
//! metrics from an already captured tool log.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xla_bench_benchmarks::{
    run_batch, BatchSummary, BenchmarkRunner, Catalog, JsonResultStore, ResultRecord, ResultSink,
    RunnerSettings, StoreError,
};
use xla_bench_core::DeviceClass;
use xla_bench_parser::{parse_log, LogText};

/// XLA Bench CLI.
#[derive(Parser, Debug)]
#[command(name = "xla-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug logs and print every stored record.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run matching benchmarks and append their results to a JSON file.
    Run {
        /// JSON file path to merge the results into.
        #[arg(short, long)]
        output: PathBuf,

        /// Regular expression matched against whole benchmark names.
        #[arg(short = 'n', long, alias = "benchmark_name")]
        benchmark_name: String,

        /// Number of iterations to benchmark.
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Path to the benchmarking tool (e.g. `run_hlo_module`).
        #[arg(long, alias = "hlo_tool")]
        hlo_tool: Option<PathBuf>,

        /// Root directory holding benchmark artifacts.
        #[arg(long, alias = "root_dir")]
        root_dir: Option<PathBuf>,

        /// Benchmark catalog (TOML).
        #[arg(short, long, env = "XLA_BENCH_CATALOG", default_value = "catalog.toml")]
        catalog: PathBuf,

        /// Settings file (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the benchmarks in the catalog.
    List {
        /// Benchmark catalog (TOML).
        #[arg(short, long, env = "XLA_BENCH_CATALOG", default_value = "catalog.toml")]
        catalog: PathBuf,
    },

    /// Extract metrics from a captured tool log.
    Parse {
        /// Device class the log was produced on (`gpu` or `cpu`).
        #[arg(short, long)]
        device: String,

        /// Iterations the tool was asked to run.
        #[arg(short, long)]
        iterations: u32,

        /// Log file.
        log: PathBuf,
    },
}

/// Parse arguments, set up logging and run the command.
///
/// # Returns
///
/// `Ok(true)` when every benchmark produced complete metrics.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);
    execute(cli)
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "xla_bench=debug" } else { "xla_bench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run an already parsed command.
pub fn execute(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Run {
            output,
            benchmark_name,
            iterations,
            hlo_tool,
            root_dir,
            catalog,
            config,
        } => {
            let mut settings = RunnerSettings::load(config.as_deref())
                .context("Failed to load settings")?;
            if let Some(iterations) = iterations {
                settings.iterations = iterations;
            }
            if let Some(hlo_tool) = hlo_tool {
                settings.hlo_tool = Some(hlo_tool);
            }
            if let Some(root_dir) = root_dir {
                settings.root_dir = root_dir;
            }
            settings.validate()?;

            let catalog = Catalog::load(&catalog)?;
            let cases = catalog.select(&benchmark_name)?;

            let runner = BenchmarkRunner::new(settings);
            let mut store = JsonResultStore::new(output);
            info!(
                selected = cases.len(),
                iterations = runner.settings().iterations,
                output = %store.path().display(),
                "running benchmarks"
            );
            let summary = if cli.verbose {
                run_batch(&runner, &cases, &mut EchoSink(&mut store))
            } else {
                run_batch(&runner, &cases, &mut store)
            };

            print_summary(&summary);
            println!("Results: {}", store.path().display());
            Ok(summary.all_passed())
        }
        Commands::List { catalog } => {
            let catalog = Catalog::load(&catalog)?;
            for case in &catalog.benchmarks {
                println!(
                    "{}  [{} / {}]",
                    case.name(),
                    case.accelerator,
                    case.identity.device
                );
            }
            println!("\nTotal benchmarks: {}", catalog.benchmarks.len());
            Ok(true)
        }
        Commands::Parse {
            device,
            iterations,
            log,
        } => {
            let device: DeviceClass = device.parse()?;
            let bytes =
                fs::read(&log).with_context(|| format!("Failed to read {}", log.display()))?;
            let parsed = parse_log(device, &LogText::from_bytes(bytes), iterations)?;

            println!("{}", serde_json::to_string_pretty(&parsed.metrics)?);
            if let Some(mismatch) = &parsed.mismatch {
                eprintln!("{} {}", "latency samples discarded:".yellow(), mismatch);
            }
            Ok(parsed.mismatch.is_none())
        }
    }
}

/// Sink printing each record as JSON before storing it.
struct EchoSink<'a>(&'a mut dyn ResultSink);

impl ResultSink for EchoSink<'_> {
    fn append(&mut self, record: &ResultRecord) -> Result<(), StoreError> {
        println!("{}", serde_json::to_string_pretty(record)?);
        self.0.append(record)
    }
}

fn print_summary(summary: &BatchSummary) {
    for name in &summary.succeeded {
        println!("{} {}", "PASS".green(), name);
    }
    for entry in &summary.mismatched {
        println!("{} {} ({})", "MISMATCH".yellow(), entry.name, entry.mismatch);
    }
    for entry in &summary.failed {
        let kind = if entry.contract_violation {
            " [unexpected log format]"
        } else {
            ""
        };
        println!("{}{} {}: {}", "FAIL".red(), kind, entry.name, entry.error);
    }
    println!(
        "Completed {} benchmarks: {} passed, {} mismatched, {} failed",
        summary.total(),
        summary.succeeded.len(),
        summary.mismatched.len(),
        summary.failed.len()
    );
}

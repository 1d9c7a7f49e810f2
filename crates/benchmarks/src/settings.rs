// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runner configuration.
//!
//! Settings are layered, later layers winning: built-in defaults, an
//! optional TOML file, then `XLA_BENCH__*` environment variables (for
//! example `XLA_BENCH__ITERATIONS=20`). Command-line flags are applied on
//! top by the CLI.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of benchmark iterations.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Default root directory holding benchmark artifacts.
pub const DEFAULT_ROOT_DIR: &str = "/tmp/openxla-benchmark/jax_xla";

/// File name of the HLO dump inside each model directory.
pub const DEFAULT_HLO_FILENAME: &str = "xla_hlo_before_optimizations.txt";

/// VLOG modules the GPU parser needs: compiler timings, allocator peaks and
/// runner start/stop markers.
pub const DEFAULT_GPU_VMODULE: &str =
    "nvptx_compiler=1,gpu_compiler=1,parse_flags_from_env=1,bfc_allocator=2,functional_hlo_runner=1";

/// Environment variable prefix for settings.
pub const ENV_PREFIX: &str = "XLA_BENCH";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("Invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Why it is invalid.
        reason: String,
    },
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings for running benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Iterations requested from the tool per benchmark.
    pub iterations: u32,
    /// Root directory of the benchmark artifacts.
    pub root_dir: PathBuf,
    /// Path of the benchmarking tool binary.
    #[serde(default)]
    pub hlo_tool: Option<PathBuf>,
    /// HLO dump file name inside each model directory.
    pub hlo_filename: String,
    /// `TF_CPP_VMODULE` value for GPU runs.
    pub gpu_vmodule: String,
    /// `TF_CPP_MIN_LOG_LEVEL` value for GPU runs.
    pub min_log_level: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            hlo_tool: None,
            hlo_filename: DEFAULT_HLO_FILENAME.to_string(),
            gpu_vmodule: DEFAULT_GPU_VMODULE.to_string(),
            min_log_level: "0".to_string(),
        }
    }
}

impl RunnerSettings {
    /// Load settings from defaults, an optional TOML file and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(file: Option<&Path>, environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("iterations", i64::from(defaults.iterations))?
            .set_default("root_dir", DEFAULT_ROOT_DIR)?
            .set_default("hlo_filename", defaults.hlo_filename)?
            .set_default("gpu_vmodule", defaults.gpu_vmodule)?
            .set_default("min_log_level", defaults.min_log_level)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder = builder.add_source(environment);

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SettingsError::Invalid {
                key: "iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.hlo_filename.is_empty() {
            return Err(SettingsError::Invalid {
                key: "hlo_filename",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

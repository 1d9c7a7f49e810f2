// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark catalog.
//!
//! The catalog is a TOML file listing the benchmarks that can be run:
//!
//! ```toml
//! [[benchmarks]]
//! benchmark_id = "8d2d7a3c"
//! benchmark_name = "models/RESNET50_FP32_JAX_3X224X224XF32_BATCH1/inputs/.../expected_outputs/..."
//! model = "RESNET50_FP32_JAX_3X224X224XF32_BATCH1"
//! framework = "JAX"
//! data_type = "fp32"
//! batch_size = 1
//! inputs = ["1x3x224x224xf32"]
//! outputs = ["1x1000xf32"]
//! device = "a2-highgpu-1g"
//! accelerator = "gpu"
//! tags = ["cnn", "resnet"]
//! ```
//!
//! The accelerator stays free text here; it is resolved into a
//! [`DeviceClass`] by the runner so that an unsupported backend fails only
//! the benchmark that names it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xla_bench_core::{BenchmarkIdentity, DeviceClass, UnsupportedAccelerator};

/// Errors that can occur while loading or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The catalog is not valid TOML for the expected shape.
    #[error("Invalid catalog: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two entries share a benchmark id.
    #[error("Duplicate benchmark id: {0}")]
    DuplicateId(String),

    /// The selection pattern is not a valid regular expression.
    #[error("Invalid benchmark name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// No benchmark name matches the selection pattern.
    #[error("No benchmark matches \"{pattern}\". Available benchmarks:\n{}", .available.join("\n"))]
    NoMatch {
        /// The pattern that was used.
        pattern: String,
        /// Every benchmark name in the catalog.
        available: Vec<String>,
    },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// A runnable benchmark: its identity plus what the runner needs to run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    /// Identity embedded in result records.
    #[serde(flatten)]
    pub identity: BenchmarkIdentity,
    /// Model directory name under the artifact root.
    pub model: String,
    /// Accelerator class of the target device, e.g. `gpu` or `cpu`.
    pub accelerator: String,
}

impl BenchmarkCase {
    /// Benchmark name.
    pub fn name(&self) -> &str {
        &self.identity.benchmark_name
    }

    /// Resolve the accelerator into a supported device class.
    pub fn device_class(&self) -> std::result::Result<DeviceClass, UnsupportedAccelerator> {
        self.accelerator.parse()
    }

    /// Location of the HLO dump: `<root_dir>/<model>/<hlo_filename>`.
    pub fn hlo_dump_path(&self, root_dir: &Path, hlo_filename: &str) -> PathBuf {
        root_dir.join(&self.model).join(hlo_filename)
    }
}

/// All benchmarks known to the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog entries in file order.
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkCase>,
}

impl Catalog {
    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)?;
        let mut seen = HashSet::new();
        for case in &catalog.benchmarks {
            if !seen.insert(case.identity.benchmark_id.as_str()) {
                return Err(CatalogError::DuplicateId(case.identity.benchmark_id.clone()));
            }
        }
        Ok(catalog)
    }

    /// Benchmark names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.benchmarks.iter().map(|b| b.name().to_string()).collect()
    }

    /// Benchmarks whose whole name matches `pattern`.
    pub fn select(&self, pattern: &str) -> Result<Vec<&BenchmarkCase>> {
        let name_pattern = Regex::new(&format!("^(?:{pattern})$"))?;
        let selected: Vec<&BenchmarkCase> = self
            .benchmarks
            .iter()
            .filter(|b| name_pattern.is_match(b.name()))
            .collect();

        if selected.is_empty() {
            return Err(CatalogError::NoMatch {
                pattern: pattern.to_string(),
                available: self.names(),
            });
        }
        Ok(selected)
    }
}

// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark identity metadata.
//!
//! A [`BenchmarkIdentity`] is the static description of what was measured:
//! model, framework, data type, batch size, tensor shapes and target device.
//! It is copied verbatim from the benchmark catalog and embedded in every
//! result record so that results from different runs can be compared
//! without consulting the catalog again.

use serde::{Deserialize, Serialize};

/// Compiler name recorded for results produced by this driver.
pub const DEFAULT_COMPILER: &str = "xla";

/// Static metadata describing one benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkIdentity {
    /// Stable unique id of the benchmark.
    pub benchmark_id: String,
    /// Human-readable benchmark name, used for selection.
    pub benchmark_name: String,
    /// Framework the model was exported from (e.g. `JAX`, `TF_V2`).
    pub framework: String,
    /// Model data type (e.g. `fp32`, `bf16`).
    pub data_type: String,
    /// Batch size the model was exported with.
    pub batch_size: u32,
    /// Input tensor shapes, e.g. `1x512xi32`.
    pub inputs: Vec<String>,
    /// Output tensor shapes.
    pub outputs: Vec<String>,
    /// Compiler under test.
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Target device name (e.g. `a2-highgpu-1g`).
    pub device: String,
    /// Free-form tags from the model and its implementation.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

impl BenchmarkIdentity {
    /// Create a new builder.
    pub fn builder() -> BenchmarkIdentityBuilder {
        BenchmarkIdentityBuilder::default()
    }
}

/// Builder for [`BenchmarkIdentity`] instances.
#[derive(Debug, Default)]
pub struct BenchmarkIdentityBuilder {
    benchmark_id: Option<String>,
    benchmark_name: Option<String>,
    framework: Option<String>,
    data_type: Option<String>,
    batch_size: Option<u32>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    compiler: Option<String>,
    device: Option<String>,
    tags: Vec<String>,
}

impl BenchmarkIdentityBuilder {
    /// Set benchmark id (required).
    pub fn benchmark_id(mut self, id: impl Into<String>) -> Self {
        self.benchmark_id = Some(id.into());
        self
    }

    /// Set benchmark name (required).
    pub fn benchmark_name(mut self, name: impl Into<String>) -> Self {
        self.benchmark_name = Some(name.into());
        self
    }

    /// Set framework (required).
    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    /// Set data type (required).
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Set batch size (required, non-zero).
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Add an input tensor shape.
    pub fn input(mut self, shape: impl Into<String>) -> Self {
        self.inputs.push(shape.into());
        self
    }

    /// Add an output tensor shape.
    pub fn output(mut self, shape: impl Into<String>) -> Self {
        self.outputs.push(shape.into());
        self
    }

    /// Set compiler name. Defaults to [`DEFAULT_COMPILER`].
    pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = Some(compiler.into());
        self
    }

    /// Set target device name (required).
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Build the [`BenchmarkIdentity`]. Returns `Err` if required fields are missing.
    pub fn build(self) -> crate::Result<BenchmarkIdentity> {
        let benchmark_id = self
            .benchmark_id
            .ok_or_else(|| crate::Error::invalid_input("benchmark_id is required"))?;
        let benchmark_name = self
            .benchmark_name
            .ok_or_else(|| crate::Error::invalid_input("benchmark_name is required"))?;
        let framework = self
            .framework
            .ok_or_else(|| crate::Error::invalid_input("framework is required"))?;
        let data_type = self
            .data_type
            .ok_or_else(|| crate::Error::invalid_input("data_type is required"))?;
        let batch_size = self
            .batch_size
            .ok_or_else(|| crate::Error::invalid_input("batch_size is required"))?;
        let device = self
            .device
            .ok_or_else(|| crate::Error::invalid_input("device is required"))?;

        if batch_size == 0 {
            return Err(crate::Error::invalid_input("batch_size must be non-zero"));
        }

        Ok(BenchmarkIdentity {
            benchmark_id,
            benchmark_name,
            framework,
            data_type,
            batch_size,
            inputs: self.inputs,
            outputs: self.outputs,
            compiler: self.compiler.unwrap_or_else(default_compiler),
            device,
            tags: self.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> BenchmarkIdentityBuilder {
        BenchmarkIdentity::builder()
            .benchmark_id("1a2b")
            .benchmark_name("models/T5_LARGE_FP32_JAX_512XI32_BATCH1/inputs/x/expected_outputs/y")
            .framework("JAX")
            .data_type("fp32")
            .batch_size(1)
            .input("1x512xi32")
            .input("1x512xi32")
            .output("1x512x1024xf32")
            .device("a2-highgpu-1g")
            .tag("transformer-encoder")
            .tag("seqlen512")
    }

    #[test]
    fn test_builder_builds_full_identity() {
        let identity = full_builder().build().unwrap();
        assert_eq!(identity.benchmark_id, "1a2b");
        assert_eq!(identity.batch_size, 1);
        assert_eq!(identity.inputs.len(), 2);
        assert_eq!(identity.outputs, vec!["1x512x1024xf32".to_string()]);
        assert_eq!(identity.tags, vec!["transformer-encoder", "seqlen512"]);
    }

    #[test]
    fn test_builder_defaults_compiler_to_xla() {
        let identity = full_builder().build().unwrap();
        assert_eq!(identity.compiler, DEFAULT_COMPILER);

        let identity = full_builder().compiler("xla-nightly").build().unwrap();
        assert_eq!(identity.compiler, "xla-nightly");
    }

    #[test]
    fn test_builder_requires_benchmark_id() {
        let result = BenchmarkIdentity::builder()
            .benchmark_name("n")
            .framework("JAX")
            .data_type("fp32")
            .batch_size(1)
            .device("c2-standard-16")
            .build();
        assert!(result.unwrap_err().to_string().contains("benchmark_id"));
    }

    #[test]
    fn test_builder_requires_device() {
        let result = BenchmarkIdentity::builder()
            .benchmark_id("id")
            .benchmark_name("n")
            .framework("JAX")
            .data_type("fp32")
            .batch_size(1)
            .build();
        assert!(result.unwrap_err().to_string().contains("device"));
    }

    #[test]
    fn test_builder_rejects_zero_batch() {
        let result = full_builder().batch_size(0).build();
        assert!(result.unwrap_err().to_string().contains("non-zero"));
    }

    #[test]
    fn test_identity_serialization_roundtrip() {
        let identity = full_builder().build().unwrap();
        let json = serde_json::to_string(&identity).unwrap();
        let back: BenchmarkIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "benchmark_id": "id",
            "benchmark_name": "n",
            "framework": "JAX",
            "data_type": "fp32",
            "batch_size": 8,
            "inputs": [],
            "outputs": [],
            "device": "c2-standard-16"
        }"#;
        let identity: BenchmarkIdentity = serde_json::from_str(json).unwrap();
        assert!(identity.tags.is_empty());
        assert_eq!(identity.compiler, DEFAULT_COMPILER);
    }
}

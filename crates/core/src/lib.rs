// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for XLA compiler benchmarking.
//!
//! This crate holds the data model shared by the log parser, the benchmark
//! runner and the CLI:
//!
//! - [`BenchmarkIdentity`] - static benchmark metadata copied from the catalog
//! - [`MetricsRecord`] - aggregated compile time, latency and memory figures
//! - [`DeviceClass`] - the closed set of execution backends with a log parser

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod device;
pub mod error;
pub mod identity;
pub mod metrics;

pub use device::{DeviceClass, UnsupportedAccelerator};
pub use error::{Error, Result};
pub use identity::{BenchmarkIdentity, BenchmarkIdentityBuilder};
pub use metrics::MetricsRecord;

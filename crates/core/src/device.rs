// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Execution backend classification.
//!
//! Every backend emits its own log vocabulary, so the device class decides
//! which log parser and which tool command line a benchmark uses. Catalogs
//! carry the accelerator as free text; resolving it into a [`DeviceClass`]
//! is the point where unsupported backends are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A device class named by a benchmark has no log parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported accelerator: '{0}'")]
pub struct UnsupportedAccelerator(pub String);

/// Execution backends with a dedicated log parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Accelerator backend: timestamped start/stop markers, PTX compile
    /// announcements and allocator peak-memory lines.
    Gpu,
    /// Host backend: inline decimal-second compile and latency values.
    Cpu,
}

impl DeviceClass {
    /// Lowercase name used on tool command lines and in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpu => "gpu",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = UnsupportedAccelerator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpu" => Ok(Self::Gpu),
            "cpu" => Ok(Self::Cpu),
            other => Err(UnsupportedAccelerator(other.to_string())),
        }
    }
}

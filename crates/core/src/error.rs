// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error type for core model construction.

use thiserror::Error;

/// Errors raised while building core model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required field was missing or a value was out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

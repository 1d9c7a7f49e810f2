// Copyright 2025 XLA Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! XLA Bench CLI entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    match xla_bench_cli::run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

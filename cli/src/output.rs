// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Rendering of tool responses

use anyhow::{Context, Result};
use colored::Colorize;
use hive_core::application::ToolResponse;

/// Print `response` as pretty JSON on stdout; failures also get a one-line
/// summary on stderr. Returns the process exit code.
pub fn print_response(response: &ToolResponse) -> Result<i32> {
    let rendered = serde_json::to_string_pretty(response).context("Failed to render response")?;
    println!("{rendered}");

    match &response.error {
        Some(error) if !response.success => {
            eprintln!("{} {}: {}", "✗".red(), error.code.red().bold(), error.message);
            Ok(1)
        }
        _ if !response.success => Ok(1),
        _ => Ok(0),
    }
}

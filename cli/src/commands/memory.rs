// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared memory commands
//!
//! Commands: get, set, delete, list

use clap::Subcommand;
use hive_core::application::tools::{MemoryAction, MemoryParams};
use hive_core::application::{HiveTools, ToolResponse};

use super::json_arg;

#[derive(Debug, Subcommand)]
pub enum MemoryCommand {
    Get {
        key: String,
    },

    /// Store a value (JSON, or a plain string); without a value stores null
    Set {
        key: String,
        value: Option<String>,
    },

    Delete {
        key: String,
    },

    /// List stored keys
    List,
}

pub async fn execute(command: MemoryCommand, tools: &HiveTools) -> ToolResponse {
    let params = match command {
        MemoryCommand::Get { key } => MemoryParams {
            action: MemoryAction::Get,
            key: Some(key),
            value: None,
        },
        MemoryCommand::Set { key, value } => MemoryParams {
            action: MemoryAction::Set,
            key: Some(key),
            value: value.as_deref().map(json_arg),
        },
        MemoryCommand::Delete { key } => MemoryParams {
            action: MemoryAction::Delete,
            key: Some(key),
            value: None,
        },
        MemoryCommand::List => MemoryParams {
            action: MemoryAction::List,
            key: None,
            value: None,
        },
    };
    tools.memory(params).await
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the hive CLI
//!
//! Every hive command maps onto one `HiveTools` operation and yields its
//! `ToolResponse` unchanged.

pub mod config;
pub mod memory;
pub mod voting;

pub use self::config::ConfigCommand;
pub use self::memory::MemoryCommand;
pub use self::voting::VotingCommand;

use clap::Subcommand;
use hive_core::application::tools::{
    BroadcastParams, InitParams, JoinParams, LeaveParams, ShutdownParams, SpawnParams,
    StatusParams,
};
use hive_core::application::{HiveTools, ToolResponse};
use hive_core::domain::broadcast::MessagePriority;
use hive_core::domain::hive::{AgentId, Topology, WorkerRole};

#[derive(Debug, Subcommand)]
pub enum HiveCommand {
    /// Initialize (or re-initialize) the hive
    Init {
        /// mesh, hierarchical, ring or star
        #[arg(short, long, default_value = "mesh")]
        topology: Topology,

        /// Queen agent id (default: generated)
        #[arg(long, value_name = "AGENT_ID")]
        queen_id: Option<String>,
    },

    /// Show hive status
    Status {
        /// Include members, pending proposals and recent broadcasts
        #[arg(short, long)]
        verbose: bool,
    },

    /// Add an agent to the hive
    Join {
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,

        /// worker, specialist or scout
        #[arg(short, long, default_value = "worker")]
        role: WorkerRole,
    },

    /// Remove an agent from the hive
    Leave {
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,
    },

    /// Create agents and join them (count is clamped to 1..=20)
    Spawn {
        #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
        count: i64,

        #[arg(short, long, default_value = "worker")]
        role: WorkerRole,

        #[arg(long, default_value = "worker")]
        agent_type: String,

        /// Prefix of generated agent ids
        #[arg(long, default_value = "worker")]
        prefix: String,
    },

    /// Proposal voting
    Voting {
        #[command(subcommand)]
        command: VotingCommand,
    },

    /// Append a message to the broadcast log
    Broadcast {
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// low, normal, high or critical
        #[arg(short, long, default_value = "normal")]
        priority: MessagePriority,

        /// Sender id (default: system)
        #[arg(long = "from", value_name = "AGENT_ID")]
        from_id: Option<String>,
    },

    /// Shut the hive down, keeping consensus history
    Shutdown {
        /// Discard pending proposals
        #[arg(short, long)]
        force: bool,

        /// Skip the pending-proposal check entirely
        #[arg(long)]
        immediate: bool,
    },

    /// Shared memory
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },
}

pub async fn execute(command: HiveCommand, tools: &HiveTools) -> ToolResponse {
    match command {
        HiveCommand::Init { topology, queen_id } => {
            tools
                .init(InitParams {
                    topology,
                    queen_id: queen_id.map(AgentId::from),
                })
                .await
        }
        HiveCommand::Status { verbose } => tools.status(StatusParams { verbose }).await,
        HiveCommand::Join { agent_id, role } => {
            tools
                .join(JoinParams {
                    agent_id: AgentId::from(agent_id),
                    role,
                })
                .await
        }
        HiveCommand::Leave { agent_id } => {
            tools
                .leave(LeaveParams {
                    agent_id: AgentId::from(agent_id),
                })
                .await
        }
        HiveCommand::Spawn {
            count,
            role,
            agent_type,
            prefix,
        } => {
            tools
                .spawn(SpawnParams {
                    count: Some(count),
                    role: Some(role),
                    agent_type: Some(agent_type),
                    prefix: Some(prefix),
                })
                .await
        }
        HiveCommand::Voting { command } => voting::execute(command, tools).await,
        HiveCommand::Broadcast {
            message,
            priority,
            from_id,
        } => {
            tools
                .broadcast(BroadcastParams {
                    message,
                    priority,
                    from_id: from_id.map(AgentId::from),
                })
                .await
        }
        HiveCommand::Shutdown { force, immediate } => {
            tools
                .shutdown(ShutdownParams {
                    graceful: !immediate,
                    force,
                })
                .await
        }
        HiveCommand::Memory { command } => memory::execute(command, tools).await,
    }
}

/// Parse a CLI argument as JSON, falling back to a plain string.
pub(crate) fn json_arg(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
